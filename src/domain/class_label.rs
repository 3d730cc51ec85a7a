use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A class label such as `"5th"`, `"10"` or `"Nursery"`.
///
/// Labels are totally ordered: labels starting with an integer come first,
/// ascending by that integer, followed by labels without one. Ties are broken
/// lexicographically on the full label, so `Ordering::Equal` only holds for
/// identical labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassLabel(String);

impl ClassLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Leading digits with leading zeros stripped, if the label starts with a digit.
    fn numeric_prefix(&self) -> Option<&str> {
        let trimmed = self.0.trim_start();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end == 0 {
            return None;
        }
        let digits = trimmed[..end].trim_start_matches('0');
        Some(if digits.is_empty() { "0" } else { digits })
    }
}

/// Compares two decimal digit strings without leading zeros by numeric value.
fn cmp_digits(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

impl Ord for ClassLabel {
    fn cmp(&self, other: &Self) -> Ordering {
        let by_prefix = match (self.numeric_prefix(), other.numeric_prefix()) {
            (Some(a), Some(b)) => cmp_digits(a, b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_prefix.then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for ClassLabel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClassLabel {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ClassLabel {
    fn from(value: String) -> Self {
        Self(value)
    }
}
