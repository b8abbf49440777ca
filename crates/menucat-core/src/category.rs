//! Closed vocabulary shared across the import pipeline: data-source kinds,
//! product categories with their synonym table, and potency units.

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Kind of upstream data source an import batch came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Cannmenus marketplace API export.
    Cannmenus,
    /// Point-of-sale system export.
    Pos,
    /// Manually maintained spreadsheet upload.
    Spreadsheet,
}

impl SourceType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::Cannmenus => "cannmenus",
            SourceType::Pos => "pos",
            SourceType::Spreadsheet => "spreadsheet",
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SourceType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cannmenus" => Ok(SourceType::Cannmenus),
            "pos" => Ok(SourceType::Pos),
            "spreadsheet" => Ok(SourceType::Spreadsheet),
            other => Err(CoreError::InvalidSourceType(other.to_string())),
        }
    }
}

/// Canonical product category.
///
/// Every catalog product carries at most one of these. Feed vocabulary is
/// folded into this set by [`Category::normalize`]; anything non-empty the
/// synonym table does not recognize lands in `Other`, which is distinct from
/// "category unknown" (`None`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Flower,
    Prerolls,
    Vapes,
    Edibles,
    Concentrates,
    Tinctures,
    Topicals,
    Accessories,
    Other,
}

impl Category {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Flower => "flower",
            Category::Prerolls => "prerolls",
            Category::Vapes => "vapes",
            Category::Edibles => "edibles",
            Category::Concentrates => "concentrates",
            Category::Tinctures => "tinctures",
            Category::Topicals => "topicals",
            Category::Accessories => "accessories",
            Category::Other => "other",
        }
    }

    /// Fold a free-form feed category into the canonical set.
    ///
    /// Lower-cases and trims, then scans the synonym table. Returns `None`
    /// for empty input (category unknown) and `Some(Other)` for a non-empty
    /// string with no synonym entry.
    #[must_use]
    pub fn normalize(input: &str) -> Option<Category> {
        let needle = input.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        for &(synonym, category) in CATEGORY_SYNONYMS {
            if needle == synonym {
                return Some(category);
            }
        }
        Some(Category::Other)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Feed vocabulary observed across Cannmenus, POS exports, and spreadsheets,
/// keyed lowercase. Canonical names are listed too so already-normalized
/// input round-trips.
const CATEGORY_SYNONYMS: &[(&str, Category)] = &[
    ("flower", Category::Flower),
    ("flowers", Category::Flower),
    ("bud", Category::Flower),
    ("buds", Category::Flower),
    ("eighths", Category::Flower),
    ("preroll", Category::Prerolls),
    ("prerolls", Category::Prerolls),
    ("pre-roll", Category::Prerolls),
    ("pre-rolls", Category::Prerolls),
    ("joint", Category::Prerolls),
    ("joints", Category::Prerolls),
    ("vape", Category::Vapes),
    ("vapes", Category::Vapes),
    ("vape pen", Category::Vapes),
    ("cartridge", Category::Vapes),
    ("cartridges", Category::Vapes),
    ("cart", Category::Vapes),
    ("carts", Category::Vapes),
    ("disposable", Category::Vapes),
    ("disposables", Category::Vapes),
    ("edible", Category::Edibles),
    ("edibles", Category::Edibles),
    ("gummy", Category::Edibles),
    ("gummies", Category::Edibles),
    ("chocolate", Category::Edibles),
    ("chocolates", Category::Edibles),
    ("beverage", Category::Edibles),
    ("beverages", Category::Edibles),
    ("drinks", Category::Edibles),
    ("concentrate", Category::Concentrates),
    ("concentrates", Category::Concentrates),
    ("wax", Category::Concentrates),
    ("shatter", Category::Concentrates),
    ("rosin", Category::Concentrates),
    ("live resin", Category::Concentrates),
    ("dab", Category::Concentrates),
    ("dabs", Category::Concentrates),
    ("tincture", Category::Tinctures),
    ("tinctures", Category::Tinctures),
    ("drops", Category::Tinctures),
    ("topical", Category::Topicals),
    ("topicals", Category::Topicals),
    ("lotion", Category::Topicals),
    ("balm", Category::Topicals),
    ("salve", Category::Topicals),
    ("accessory", Category::Accessories),
    ("accessories", Category::Accessories),
    ("gear", Category::Accessories),
    ("other", Category::Other),
    ("misc", Category::Other),
];

/// Unit a THC/CBD potency value is denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PotencyUnit {
    Percent,
    Mg,
}

impl std::fmt::Display for PotencyUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PotencyUnit::Percent => write!(f, "percent"),
            PotencyUnit::Mg => write!(f, "mg"),
        }
    }
}
