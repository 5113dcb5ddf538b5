use serde::Serialize;

/// Provenance tag marking a record as resolved automatically rather than by hand.
pub const AUTOMATED_SOURCE: &str = "automated";

/// The administrative names containing a coordinate, or all-null when no
/// boundary in the catalog contains it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedArea {
    pub nation: Option<String>,
    pub state: Option<String>,
    pub county: Option<String>,
    /// Always [`AUTOMATED_SOURCE`]; kept on the record so downstream rows can
    /// be told apart from manually curated ones.
    pub source: &'static str,
}

impl ResolvedArea {
    pub(crate) fn unresolved() -> Self {
        Self {
            nation: None,
            state: None,
            county: None,
            source: AUTOMATED_SOURCE,
        }
    }

    /// True when no boundary contained the point.
    pub fn is_unresolved(&self) -> bool {
        self.nation.is_none() && self.state.is_none() && self.county.is_none()
    }
}
