//! Column descriptors and row records.
//!
//! Columns are described by a key, a label, an optional width, and a
//! [`ColumnKind`] that decides how cells in the column are edited and drawn.
//! Descriptors deserialize from JSON, e.g.
//!
//! ```json
//! { "key": "room", "label": "Room", "type": "capacity_bucket",
//!   "buckets": [{ "value": "101", "capacity": 2 }], "exempt_field": "no_bed" }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tourgrid_engine::engine::CellValue;

use crate::bucket::BucketColumn;
use crate::error::{GridError, Result};

/// A data row: column key -> value. Rows are identified by position only.
pub type RowRecord = BTreeMap<String, CellValue>;

/// One choice of a select column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub disabled: bool,
}

impl SelectOption {
    pub fn new(value: &str, label: &str) -> Self {
        SelectOption {
            value: value.to_string(),
            label: label.to_string(),
            disabled: false,
        }
    }
}

/// How cells of a column are edited and rendered.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnKind {
    #[default]
    Text,
    Select {
        options: Vec<SelectOption>,
    },
    ReadOnly,
    /// Assignment to one of a set of capacity-limited buckets (e.g. rooms).
    CapacityBucket(BucketColumn),
}

/// Which header affordances a column offers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnProtection {
    /// Cannot be hidden or deleted (e.g. index, name).
    Core,
    /// Can be hidden but not deleted (built-in fields).
    Protected,
    /// User-defined column: can be hidden and deleted.
    #[default]
    Custom,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub read_only: bool,
    #[serde(flatten)]
    pub kind: ColumnKind,
    #[serde(default)]
    pub protection: ColumnProtection,
}

impl ColumnDescriptor {
    pub fn text(key: &str, label: &str) -> Self {
        ColumnDescriptor {
            key: key.to_string(),
            label: label.to_string(),
            width: None,
            read_only: false,
            kind: ColumnKind::Text,
            protection: ColumnProtection::default(),
        }
    }

    pub fn select(key: &str, label: &str, options: Vec<SelectOption>) -> Self {
        Self::text(key, label).with_kind(ColumnKind::Select { options })
    }

    pub fn bucket(key: &str, label: &str, buckets: BucketColumn) -> Self {
        Self::text(key, label).with_kind(ColumnKind::CapacityBucket(buckets))
    }

    pub fn with_kind(mut self, kind: ColumnKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn with_protection(mut self, protection: ColumnProtection) -> Self {
        self.protection = protection;
        self
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only || self.kind == ColumnKind::ReadOnly
    }

    pub fn can_hide(&self) -> bool {
        self.protection != ColumnProtection::Core
    }

    pub fn can_delete(&self) -> bool {
        self.protection == ColumnProtection::Custom
    }

    pub fn bucket_column(&self) -> Option<&BucketColumn> {
        match &self.kind {
            ColumnKind::CapacityBucket(buckets) => Some(buckets),
            _ => None,
        }
    }
}

/// Column keys must be unique within a grid.
pub fn validate_columns(columns: &[ColumnDescriptor]) -> Result<()> {
    let mut seen = HashSet::new();
    for column in columns {
        if !seen.insert(column.key.as_str()) {
            return Err(GridError::DuplicateColumn(column.key.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_only_from_flag_or_kind() {
        assert!(!ColumnDescriptor::text("a", "A").is_read_only());
        assert!(ColumnDescriptor::text("a", "A").with_read_only().is_read_only());
        assert!(
            ColumnDescriptor::text("a", "A")
                .with_kind(ColumnKind::ReadOnly)
                .is_read_only()
        );
    }

    #[test]
    fn test_protection_affordances() {
        let core = ColumnDescriptor::text("name", "Name").with_protection(ColumnProtection::Core);
        let builtin =
            ColumnDescriptor::text("gender", "Gender").with_protection(ColumnProtection::Protected);
        let custom = ColumnDescriptor::text("memo", "Memo");

        assert!(!core.can_hide() && !core.can_delete());
        assert!(builtin.can_hide() && !builtin.can_delete());
        assert!(custom.can_hide() && custom.can_delete());
    }

    #[test]
    fn test_deserialize_descriptors() {
        let json = r#"[
            {"key": "price", "label": "Price", "type": "text", "width": 80},
            {"key": "total", "label": "Total", "type": "text", "read_only": true},
            {"key": "meal", "label": "Meal", "type": "select",
             "options": [{"value": "veg", "label": "Vegetarian"}]},
            {"key": "room", "label": "Room", "type": "capacity_bucket",
             "buckets": [{"value": "101", "capacity": 2}], "exempt_field": "no_bed",
             "protection": "protected"}
        ]"#;
        let columns: Vec<ColumnDescriptor> = serde_json::from_str(json).unwrap();

        assert_eq!(columns[0].width, Some(80));
        assert!(columns[1].is_read_only());
        assert_eq!(
            columns[2].kind,
            ColumnKind::Select {
                options: vec![SelectOption::new("veg", "Vegetarian")]
            }
        );
        let buckets = columns[3].bucket_column().unwrap();
        assert_eq!(buckets.buckets[0].capacity, 2);
        assert_eq!(buckets.exempt_field.as_deref(), Some("no_bed"));
        assert_eq!(columns[3].protection, ColumnProtection::Protected);
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let columns = vec![ColumnDescriptor::text("a", "A"), ColumnDescriptor::text("a", "B")];
        assert!(matches!(
            validate_columns(&columns),
            Err(GridError::DuplicateColumn(key)) if key == "a"
        ));
    }
}
