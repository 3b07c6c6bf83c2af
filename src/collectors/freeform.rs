//! Free-form collector: pasted meeting notes.

use serde::{Deserialize, Serialize};

use crate::error::ValidationErrors;
use crate::profile::PartialProfile;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeformNotes {
    pub notes: String,
    #[serde(default)]
    pub current_tools: String,
}

impl FreeformNotes {
    pub fn collect(&self) -> Result<PartialProfile, ValidationErrors> {
        if self.notes.trim().is_empty() {
            return Err(ValidationErrors::single("notes", "Meeting notes are required."));
        }
        Ok(PartialProfile {
            notes: Some(self.notes.clone()),
            current_tools: Some(self.current_tools.clone()),
            ..Default::default()
        })
    }
}
