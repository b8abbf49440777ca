//! Wire types for the supported feed formats and their conversion into the
//! canonical [`RawProductData`] intermediate.
//!
//! ## Observed shapes
//!
//! ### Cannmenus
//! JSON array of camelCase objects. `thc`/`cbd` arrive either as numbers
//! (`22.4`) or labeled strings (`"22.4%"`, `"100mg"`); `price` is a number or
//! a `"$45.00"` string. `images` may be absent, `image` holds a single URL on
//! older menus. Unrecognized fields are preserved in the raw-data bag.
//!
//! ### POS exports
//! Flat rows keyed by SKU. The category lives in `department`; potency comes
//! as `thcPercent`/`cbdPercent` strings with a `%` suffix; free-text `notes`
//! doubles as the description.
//!
//! ### Spreadsheets
//! Everything is a string, including price and potency; `effects` is a
//! comma-separated list. Blank cells arrive as empty strings, which the
//! parser treats as absent.
//!
//! Each format converts through exactly one `into_raw` function; nothing
//! downstream of [`RawProductData`] knows which feed a record came from
//! beyond the [`SourceType`] tag on the batch.

use menucat_core::SourceType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::IngestError;

/// A loosely-typed numeric field: feeds send both JSON numbers and strings
/// with unit or currency decoration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Num(f64),
    Text(String),
}

impl RawNumber {
    /// The original textual form, if the value arrived as a string. Used for
    /// unit detection (`"100mg"` vs `"22%"`).
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawNumber::Num(_) => None,
            RawNumber::Text(s) => Some(s.as_str()),
        }
    }
}

/// Canonical intermediate shape every feed format converts into before
/// parsing. Only `external_id` and `name` are required for a record to
/// parse; everything else is best-effort.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawProductData {
    pub external_id: String,
    pub name: String,
    pub brand_name: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub strain_type: Option<String>,
    pub thc: Option<RawNumber>,
    pub cbd: Option<RawNumber>,
    pub price: Option<RawNumber>,
    pub image_url: Option<String>,
    pub image_urls: Vec<String>,
    pub description: Option<String>,
    pub effects: Vec<String>,
    /// Opaque bag of source-specific fields, retained for audit.
    pub raw_data: Option<Value>,
}

/// One product entry from a Cannmenus marketplace export.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CannmenusRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub strain_type: Option<String>,
    #[serde(default)]
    pub thc: Option<RawNumber>,
    #[serde(default)]
    pub cbd: Option<RawNumber>,
    #[serde(default)]
    pub price: Option<RawNumber>,
    /// Single-image form used by older menus.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub effects: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl CannmenusRecord {
    #[must_use]
    pub fn into_raw(self) -> RawProductData {
        let raw_data = if self.extra.is_empty() {
            None
        } else {
            Some(Value::Object(self.extra))
        };
        RawProductData {
            external_id: self.id,
            name: self.name,
            brand_name: self.brand,
            category: self.category,
            subcategory: self.subcategory,
            strain_type: self.strain_type,
            thc: self.thc,
            cbd: self.cbd,
            price: self.price,
            image_url: self.image,
            image_urls: self.images,
            description: self.description,
            effects: self.effects,
            raw_data,
        }
    }
}

/// One row from a point-of-sale inventory export.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PosExportRow {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub vendor: Option<String>,
    /// POS department, mapped to the category vocabulary downstream.
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub strain_type: Option<String>,
    #[serde(default)]
    pub thc_percent: Option<RawNumber>,
    #[serde(default)]
    pub cbd_percent: Option<RawNumber>,
    #[serde(default)]
    pub unit_price: Option<RawNumber>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl PosExportRow {
    #[must_use]
    pub fn into_raw(self) -> RawProductData {
        let raw_data = if self.extra.is_empty() {
            None
        } else {
            Some(Value::Object(self.extra))
        };
        RawProductData {
            external_id: self.sku,
            name: self.name,
            brand_name: self.vendor,
            category: self.department,
            subcategory: self.subcategory,
            strain_type: self.strain_type,
            thc: self.thc_percent,
            cbd: self.cbd_percent,
            price: self.unit_price,
            image_url: self.image_url,
            image_urls: vec![],
            description: self.notes,
            effects: vec![],
            raw_data,
        }
    }
}

/// One row from a manually maintained spreadsheet upload. All cells are
/// strings; blank cells arrive as empty strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetRow {
    pub external_id: String,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub thc: Option<String>,
    #[serde(default)]
    pub cbd: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Comma-separated, e.g. `"relaxed, sleepy"`.
    #[serde(default)]
    pub effects: Option<String>,
}

impl SpreadsheetRow {
    #[must_use]
    pub fn into_raw(self) -> RawProductData {
        let non_blank = |s: Option<String>| s.filter(|v| !v.trim().is_empty());
        let effects = self
            .effects
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect();
        RawProductData {
            external_id: self.external_id,
            name: self.name,
            brand_name: non_blank(self.brand),
            category: non_blank(self.category),
            subcategory: None,
            strain_type: None,
            thc: non_blank(self.thc).map(RawNumber::Text),
            cbd: non_blank(self.cbd).map(RawNumber::Text),
            price: non_blank(self.price).map(RawNumber::Text),
            image_url: non_blank(self.image_url),
            image_urls: vec![],
            description: non_blank(self.description),
            effects,
            raw_data: None,
        }
    }
}

/// Decode a raw feed payload (a JSON array in the format's native shape)
/// into the canonical intermediate records.
///
/// # Errors
///
/// Returns [`IngestError::Decode`] when the payload does not match the
/// declared format. Per-record data-quality problems are NOT errors here;
/// they surface as parse diagnostics downstream.
pub fn decode_feed(
    source_type: SourceType,
    payload: &str,
) -> Result<Vec<RawProductData>, IngestError> {
    let decode_err = |source| IngestError::Decode {
        source_type,
        source,
    };
    match source_type {
        SourceType::Cannmenus => {
            let records: Vec<CannmenusRecord> =
                serde_json::from_str(payload).map_err(decode_err)?;
            Ok(records.into_iter().map(CannmenusRecord::into_raw).collect())
        }
        SourceType::Pos => {
            let rows: Vec<PosExportRow> = serde_json::from_str(payload).map_err(decode_err)?;
            Ok(rows.into_iter().map(PosExportRow::into_raw).collect())
        }
        SourceType::Spreadsheet => {
            let rows: Vec<SpreadsheetRow> = serde_json::from_str(payload).map_err(decode_err)?;
            Ok(rows.into_iter().map(SpreadsheetRow::into_raw).collect())
        }
    }
}
