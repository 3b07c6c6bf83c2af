//! Field collectors: the three interchangeable ways of gathering discovery
//! input.
//!
//! Each collector validates its own input and emits a [`PartialProfile`].
//! Validation failures stay here; the wizard only ever sees a valid partial
//! profile.

pub mod checklist;
pub mod freeform;
pub mod guided;

use serde::{Deserialize, Serialize};

use crate::catalog::DiscoveryCatalog;
use crate::error::ValidationErrors;
use crate::profile::PartialProfile;

pub use checklist::ChecklistForm;
pub use freeform::FreeformNotes;
pub use guided::GuidedAnswers;

/// How discovery data is collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    Guided,
    Freeform,
    Checklist,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Guided => "guided",
            Self::Freeform => "freeform",
            Self::Checklist => "checklist",
        };
        write!(f, "{s}")
    }
}

/// Input from whichever collector is active, tagged by mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CollectorInput {
    Guided(GuidedAnswers),
    Freeform(FreeformNotes),
    Checklist(ChecklistForm),
}

impl CollectorInput {
    pub fn mode(&self) -> InputMode {
        match self {
            Self::Guided(_) => InputMode::Guided,
            Self::Freeform(_) => InputMode::Freeform,
            Self::Checklist(_) => InputMode::Checklist,
        }
    }

    /// Validate the input and produce the partial profile it contributes.
    pub fn collect(&self, catalog: &DiscoveryCatalog) -> Result<PartialProfile, ValidationErrors> {
        match self {
            Self::Guided(answers) => answers.collect(&catalog.questions),
            Self::Freeform(notes) => notes.collect(),
            Self::Checklist(form) => form.collect(catalog),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_serde() {
        for mode in [InputMode::Guided, InputMode::Freeform, InputMode::Checklist] {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(format!("\"{mode}\""), json);
        }
    }

    #[test]
    fn input_is_tagged_by_mode() {
        let json = serde_json::json!({
            "mode": "freeform",
            "notes": "Client wants better lead tracking",
            "currentTools": "Sheets"
        });
        let input: CollectorInput = serde_json::from_value(json).unwrap();
        assert_eq!(input.mode(), InputMode::Freeform);

        let catalog = DiscoveryCatalog::builtin().unwrap();
        let partial = input.collect(&catalog).unwrap();
        assert_eq!(partial.current_tools.as_deref(), Some("Sheets"));
    }

    #[test]
    fn checklist_input_parses_from_json() {
        let json = serde_json::json!({
            "mode": "checklist",
            "companySize": "25",
            "timeline": "6-12 months",
            "challenges": [{"title": "Slow invoicing"}],
            "goals": [],
            "currentTools": ""
        });
        let input: CollectorInput = serde_json::from_value(json).unwrap();
        assert_eq!(input.mode(), InputMode::Checklist);
        let catalog = DiscoveryCatalog::builtin().unwrap();
        let partial = input.collect(&catalog).unwrap();
        assert_eq!(partial.company_size, Some(25));
    }
}
