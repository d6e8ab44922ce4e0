use anyhow::{Context, Result};
use regex::Regex;

use crate::report::ITEM_MARKER;

/// Per-cell repairs for decoded report fields. Holds the compiled
/// split-code pattern so callers build it once per merge.
pub struct CellNormalizer {
    split_code: Regex,
}

impl CellNormalizer {
    pub fn new() -> Result<Self> {
        let split_code =
            Regex::new(r"(\d{4})-(\d{3})").context("failed to compile split code regex")?;
        Ok(Self { split_code })
    }

    /// Order matters: trim, repair the truncated currency literal the
    /// report prints for zero amounts, drop the item marker (inventory
    /// cells only), then rejoin mis-hyphenated identifiers.
    pub fn normalize(&self, cell: &str, strip_item_marker: bool) -> String {
        let trimmed = cell.trim();
        if trimmed == ".00" {
            return "0.00".to_string();
        }

        let cell = if strip_item_marker {
            trimmed.replace(ITEM_MARKER, "")
        } else {
            trimmed.to_string()
        };

        self.split_code.replace_all(&cell, "$1$2").into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        let normalizer = CellNormalizer::new().unwrap();
        assert_eq!(normalizer.normalize("  OFFICE CHAIR  ", true), "OFFICE CHAIR");
    }

    #[test]
    fn repairs_truncated_currency_literal() {
        let normalizer = CellNormalizer::new().unwrap();
        assert_eq!(normalizer.normalize("       .00", true), "0.00");
        assert_eq!(normalizer.normalize(".00", false), "0.00");
        assert_eq!(normalizer.normalize("1,234.00", true), "1,234.00");
    }

    #[test]
    fn strips_item_marker_from_inventory_cells_only() {
        let normalizer = CellNormalizer::new().unwrap();
        assert_eq!(normalizer.normalize(ITEM_MARKER, true), "");
        assert_eq!(normalizer.normalize(ITEM_MARKER, false), ITEM_MARKER);
    }

    #[test]
    fn rejoins_mis_hyphenated_identifiers() {
        let normalizer = CellNormalizer::new().unwrap();
        assert_eq!(normalizer.normalize("1234-567", true), "1234567");
        assert_eq!(normalizer.normalize("PO 9876-543 OPEN", false), "PO 9876543 OPEN");
        assert_eq!(normalizer.normalize("123-456", true), "123-456");
    }

    #[test]
    fn repairs_are_idempotent() {
        let normalizer = CellNormalizer::new().unwrap();
        for cell in ["  .00 ", "1234-567", " OFFICE CHAIR ", ITEM_MARKER, "1,234.56"] {
            let once = normalizer.normalize(cell, true);
            assert_eq!(normalizer.normalize(&once, true), once);
        }
    }
}
