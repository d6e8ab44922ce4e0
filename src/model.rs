use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One merged row, keyed by header name in header order.
pub type Entry = Map<String, Value>;

/// Grouped table representation: key value -> rows in encounter order.
/// `BTreeMap` keeps the key view in ascending lexicographic order.
pub type KeyedStore = BTreeMap<String, Vec<Entry>>;

pub const SNAPSHOT_VERSION: u32 = 1;

/// The persisted database document. `null` is the wire form of an absent
/// field; keys missing from an older document fall back to defaults on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub snapshot_version: u32,
    pub last_updated_timestamp: Option<i64>,
    pub updated_from_source_id: Option<String>,
    pub inventory_store: KeyedStore,
    pub certification_store: KeyedStore,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            snapshot_version: SNAPSHOT_VERSION,
            last_updated_timestamp: None,
            updated_from_source_id: None,
            inventory_store: KeyedStore::new(),
            certification_store: KeyedStore::new(),
        }
    }
}

/// Column contract for one of the two merged tables.
#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub header: &'static [&'static str],
    pub key_column: usize,
    pub strip_item_marker: bool,
}

/// Inventory line items. The trailing UNIT column is appended from the
/// owning block's code, not decoded from the item line.
pub const INVENTORY_TABLE: TableSpec = TableSpec {
    header: &[
        "DESCRIPTION",
        "CURRENT ITEM NO.",
        "OLD ITEM NO.",
        "SERIAL NUMBER",
        "FOUND",
        "BLDG",
        "FLOOR",
        "ROOM",
        "MISSING-STOLEN,DATE",
        "ORIGINAL COST",
        "DEPRECIATED AMOUNT",
        "O W N",
        "ORIGINAL PO NO.",
        "COMMENTS",
        "DATE ACQUIRED",
        "UNIT",
    ],
    key_column: 1,
    strip_item_marker: true,
};

/// Per-unit certification summary.
pub const CERTIFICATION_TABLE: TableSpec = TableSpec {
    header: &[
        "Unit",
        "# of items FOUND",
        "Total # of items",
        "DEPR Value Unfound",
        "DEPR total value",
    ],
    key_column: 0,
    strip_item_marker: false,
};

/// Presentation-layer view of one merged table, written by `export`.
#[derive(Debug, Clone, Serialize)]
pub struct TableExport {
    pub generated_at: String,
    pub last_updated_timestamp: Option<i64>,
    pub updated_from_source_id: Option<String>,
    pub header_row: Vec<String>,
    pub rows: Vec<Vec<String>>,
}
