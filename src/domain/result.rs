use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Outcome of one pipeline run: successful writes per category label
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateResult {
    pub counts: HashMap<String, usize>,
    pub duration: Duration,
}

impl AggregateResult {
    /// Number of successfully written records for a category (0 if unseen)
    pub fn count(&self, category: &str) -> usize {
        self.counts.get(category).copied().unwrap_or(0)
    }

    /// Sum over all categories
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Categories with their counts, ordered by label
    pub fn sorted(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<_> = self
            .counts
            .iter()
            .map(|(label, count)| (label.as_str(), *count))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl fmt::Display for AggregateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (label, count) in self.sorted() {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", label, count)?;
            first = false;
        }
        Ok(())
    }
}
