//! Feed ingestion for menucat: per-source wire types, value normalization,
//! and the batch parser that turns raw feed records into staging products.

pub mod error;
pub mod normalize;
pub mod parser;
pub mod sources;

pub use error::IngestError;
pub use parser::{ensure_batch_within_limit, parse_batch, ImportContext, ParseResult};
pub use sources::{decode_feed, CannmenusRecord, PosExportRow, RawNumber, RawProductData, SpreadsheetRow};
