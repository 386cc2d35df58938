//! Save status shown on the page's status field

use serde::{Deserialize, Serialize};

/// Lifecycle of the most recent save attempt as the user sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Error,
}

impl SaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaveStatus::Idle => "idle",
            SaveStatus::Saving => "saving",
            SaveStatus::Saved => "saved",
            SaveStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inline styles applied to the status field for each visual state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusStyles {
    pub pending: String,
    pub success: String,
    pub error: String,
}

impl Default for StatusStyles {
    fn default() -> Self {
        Self {
            pending: "background-color:yellow".to_string(),
            success: "background-color:#99FF99".to_string(),
            error: "background-color:red".to_string(),
        }
    }
}

impl StatusStyles {
    /// Style for a status, `None` for idle which leaves the field alone
    pub fn for_status(&self, status: SaveStatus) -> Option<&str> {
        match status {
            SaveStatus::Idle => None,
            SaveStatus::Saving => Some(self.pending.as_str()),
            SaveStatus::Saved => Some(self.success.as_str()),
            SaveStatus::Error => Some(self.error.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_styles_per_status() {
        let styles = StatusStyles::default();
        assert_eq!(styles.for_status(SaveStatus::Idle), None);
        assert_eq!(
            styles.for_status(SaveStatus::Saving),
            Some("background-color:yellow")
        );
        assert_eq!(
            styles.for_status(SaveStatus::Error),
            Some("background-color:red")
        );
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&SaveStatus::Saved).unwrap(),
            "\"saved\""
        );
        assert_eq!(SaveStatus::Saving.to_string(), "saving");
        assert_eq!(SaveStatus::default(), SaveStatus::Idle);
    }
}
