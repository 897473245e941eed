use crate::Value;
use std::sync::Arc;

pub type Row = Box<[Value]>;

/// Result row together with the column labels reported by the store.
///
/// Rows of the same result set share their labels.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLabeled {
    pub labels: Arc<[String]>,
    pub values: Row,
}

impl RowLabeled {
    pub fn new(labels: Arc<[String]>, values: Row) -> Self {
        Self { labels, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of the first column whose label equals `label` ignoring case.
    pub fn get(&self, label: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v.eq_ignore_ascii_case(label))
            .map(|i| &self.values[i])
    }
}
