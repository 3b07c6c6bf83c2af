//! Customer profile and proposal data models.

use serde::{Deserialize, Serialize};

/// The industry pair chosen at the first wizard step. Frozen until restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustrySelection {
    pub industry: String,
    pub sub_industry: String,
}

impl IndustrySelection {
    pub fn new(industry: impl Into<String>, sub_industry: impl Into<String>) -> Self {
        Self {
            industry: industry.into(),
            sub_industry: sub_industry.into(),
        }
    }
}

/// A titled challenge or goal entered in the checklist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeGoal {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl ChallengeGoal {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Entries with a blank title are dropped before submission.
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

/// Fields a collector may contribute. Anything left `None` falls back to the
/// merge defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenges: Option<Vec<ChallengeGoal>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goals: Option<Vec<ChallengeGoal>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_tools: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// The full request payload handed to the generation gateway.
///
/// Notes and challenge/goal lists usually come from different collectors, but
/// nothing here forbids both being present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    pub industry: String,
    pub sub_industry: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    pub challenges: Vec<ChallengeGoal>,
    pub goals: Vec<ChallengeGoal>,
    pub current_tools: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CustomerProfile {
    /// Shallow merge of the frozen selection, collector fields, and defaults.
    ///
    /// Collector fields always win; omitted ones become `challenges: []`,
    /// `goals: []`, `currentTools: ""`.
    pub fn merge(selection: &IndustrySelection, partial: PartialProfile) -> Self {
        Self {
            industry: selection.industry.clone(),
            sub_industry: selection.sub_industry.clone(),
            company_size: partial.company_size,
            timeline: partial.timeline,
            challenges: partial.challenges.unwrap_or_default(),
            goals: partial.goals.unwrap_or_default(),
            current_tools: partial.current_tools.unwrap_or_default(),
            notes: partial.notes,
        }
    }
}

/// One recommended service and its business outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalSolution {
    pub service_name: String,
    pub outcomes: Vec<String>,
}

/// A generated proposal. Only ever produced by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub solutions: Vec<ProposalSolution>,
    pub summary: String,
}
