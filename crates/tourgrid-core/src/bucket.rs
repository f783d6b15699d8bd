//! Capacity-limited bucket assignment (rooms, seats, ...).
//!
//! A bucket column stores the bucket value a row is assigned to. A bucket is
//! full once the rows assigned to it reach its capacity; rows flagged by the
//! column's `exempt_field` (e.g. a child without a bed) never count.

use serde::{Deserialize, Serialize};

use crate::column::{RowRecord, SelectOption};

/// Label of the choice that clears an assignment.
pub const UNASSIGNED_LABEL: &str = "Unassigned";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub value: String,
    /// Display name; the value is shown when empty.
    #[serde(default)]
    pub label: String,
    pub capacity: usize,
}

impl Bucket {
    pub fn new(value: &str, capacity: usize) -> Self {
        Bucket {
            value: value.to_string(),
            label: String::new(),
            capacity,
        }
    }

    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.value
        } else {
            &self.label
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketColumn {
    pub buckets: Vec<Bucket>,
    /// Row field that, when truthy, exempts the row from capacity counts.
    #[serde(default)]
    pub exempt_field: Option<String>,
}

/// Occupancy of one bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BucketUsage {
    pub occupied: usize,
    pub capacity: usize,
}

impl BucketUsage {
    pub fn is_full(&self) -> bool {
        self.occupied >= self.capacity
    }
}

impl BucketColumn {
    pub fn new(buckets: Vec<Bucket>) -> Self {
        BucketColumn {
            buckets,
            exempt_field: None,
        }
    }

    pub fn with_exempt_field(mut self, field: &str) -> Self {
        self.exempt_field = Some(field.to_string());
        self
    }

    pub fn bucket(&self, value: &str) -> Option<&Bucket> {
        self.buckets.iter().find(|b| b.value == value)
    }

    pub fn is_exempt(&self, row: &RowRecord) -> bool {
        self.exempt_field
            .as_ref()
            .and_then(|field| row.get(field))
            .is_some_and(|value| value.is_truthy())
    }

    /// Count rows assigned to `value`, skipping exempt rows and `exclude_row`.
    pub fn usage(
        &self,
        column_key: &str,
        value: &str,
        rows: &[RowRecord],
        exclude_row: Option<usize>,
    ) -> BucketUsage {
        let occupied = rows
            .iter()
            .enumerate()
            .filter(|(idx, _)| Some(*idx) != exclude_row)
            .filter(|(_, row)| assigned(row, column_key).as_deref() == Some(value))
            .filter(|(_, row)| !self.is_exempt(row))
            .count();
        // Unknown buckets hold nobody.
        let capacity = self.bucket(value).map(|b| b.capacity).unwrap_or(0);
        BucketUsage { occupied, capacity }
    }

    /// Whether `row_index` can be moved into `value`. Clearing an assignment
    /// and exempt rows are always allowed.
    pub fn can_assign(
        &self,
        column_key: &str,
        value: &str,
        rows: &[RowRecord],
        row_index: usize,
    ) -> bool {
        if value.is_empty() {
            return true;
        }
        if let Some(row) = rows.get(row_index) {
            if assigned(row, column_key).as_deref() == Some(value) || self.is_exempt(row) {
                return true;
            }
        }
        !self
            .usage(column_key, value, rows, Some(row_index))
            .is_full()
    }

    /// Choices offered to `row_index`: the unassigned option, then every bucket
    /// that still has room plus the one the row already occupies.
    pub fn choices(
        &self,
        column_key: &str,
        rows: &[RowRecord],
        row_index: usize,
    ) -> Vec<SelectOption> {
        let mut options = vec![SelectOption::new("", UNASSIGNED_LABEL)];
        for bucket in &self.buckets {
            if !self.can_assign(column_key, &bucket.value, rows, row_index) {
                continue;
            }
            let usage = self.usage(column_key, &bucket.value, rows, None);
            options.push(SelectOption::new(
                &bucket.value,
                &format!(
                    "{} ({}/{})",
                    bucket.display_label(),
                    usage.occupied,
                    usage.capacity
                ),
            ));
        }
        options
    }
}

fn assigned(row: &RowRecord, column_key: &str) -> Option<String> {
    row.get(column_key)
        .filter(|v| !v.is_empty())
        .map(|v| v.to_input_string())
}
