//! Task counts keyed by status label.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::task::Task;

/// Label used for tasks stored without a status
pub const UNKNOWN_STATUS: &str = "unknown";

/// Number of tasks per stored status label
///
/// Serializes as a plain JSON object, e.g. `{"Done": 1, "Todo": 2}`.
/// Labels are taken verbatim from storage, so unrecognised labels get their
/// own bucket rather than being folded into `"unknown"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusCounts(BTreeMap<String, u64>);

impl StatusCounts {
    /// Folds a sequence of stored status labels into counts
    pub fn tally<'a, I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut counts = BTreeMap::new();
        for status in statuses {
            let label = status.unwrap_or(UNKNOWN_STATUS);
            *counts.entry(label.to_string()).or_insert(0) += 1;
        }
        Self(counts)
    }

    /// Counts the statuses of `tasks`
    pub fn from_tasks(tasks: &[Task]) -> Self {
        Self::tally(tasks.iter().map(|task| task.status.as_deref()))
    }

    /// Count for one label (zero if absent)
    pub fn get(&self, label: &str) -> u64 {
        self.0.get(label).copied().unwrap_or(0)
    }

    /// Sum over all labels
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(label, count)| (label.as_str(), *count))
    }
}
