//! Check results: status, severity, and the per-attribute difference ledger.
//!
//! Every resource's `check` produces a [`Status`]: an identifying label, a
//! change flag, a severity, and an ordered list of [`Difference`] entries
//! comparing observed state against declared state.

use serde::Serialize;

/// Severity of a check result.
///
/// Ordered so that `Fatal > WillChange > Ok`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Observed state matches declared state.
    #[default]
    Ok,
    /// Applying the resource would change external state.
    WillChange,
    /// The check itself failed; reconciliation cannot proceed.
    Fatal,
}

/// One attribute's observed, desired, and default values.
///
/// A difference whose actual value equals its default is informational
/// rather than alarming, but is still recorded for visibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Difference {
    /// Attribute name.
    pub name: String,
    /// Observed value.
    pub actual: String,
    /// Desired value.
    pub expected: String,
    /// The value the external system would supply on its own.
    pub default: String,
}

impl Difference {
    /// Returns true if the observed value differs from the desired value.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.actual != self.expected
    }
}

/// The per-resource result of a check.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Status {
    /// Identifying label for reporting.
    pub label: String,
    /// Whether applying the resource would change external state.
    pub will_change: bool,
    /// Severity of the result.
    pub severity: Severity,
    /// Ordered difference entries, one per compared attribute.
    pub differences: Vec<Difference>,
}

impl Status {
    /// Creates a new status with the given label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            will_change: false,
            severity: Severity::Ok,
            differences: Vec::new(),
        }
    }

    /// Records a difference entry.
    pub fn add_difference(
        &mut self,
        name: impl Into<String>,
        actual: impl Into<String>,
        expected: impl Into<String>,
        default: impl Into<String>,
    ) {
        self.differences.push(Difference {
            name: name.into(),
            actual: actual.into(),
            expected: expected.into(),
            default: default.into(),
        });
    }

    /// Returns true if at least one difference would change external state.
    #[must_use]
    pub fn any_changes(&self) -> bool {
        self.differences.iter().any(Difference::changed)
    }

    /// Raises the change flag and severity when any difference changed.
    pub fn settle(&mut self) {
        if self.any_changes() {
            self.will_change = true;
            self.severity = Severity::WillChange;
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Ok => "ok",
            Self::WillChange => "will change",
            Self::Fatal => "fatal",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for Difference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:?} => {:?}", self.name, self.actual, self.expected)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.label, self.severity)?;
        for diff in self.differences.iter().filter(|d| d.changed()) {
            write!(f, "\n  {diff}")?;
        }
        Ok(())
    }
}
