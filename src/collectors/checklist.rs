//! Quick checklist collector: company size, timeline, and titled
//! challenge/goal lists.

use serde::{Deserialize, Serialize};

use crate::catalog::DiscoveryCatalog;
use crate::error::ValidationErrors;
use crate::profile::{ChallengeGoal, PartialProfile};

const DEFAULT_COMPANY_SIZE: &str = "10";
const DEFAULT_TIMELINE: &str = "3-6 months";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistForm {
    /// Raw text as typed; parsed on submit.
    pub company_size: String,
    pub timeline: String,
    #[serde(default)]
    pub challenges: Vec<ChallengeGoal>,
    #[serde(default)]
    pub goals: Vec<ChallengeGoal>,
    #[serde(default)]
    pub current_tools: String,
}

impl Default for ChecklistForm {
    fn default() -> Self {
        Self {
            company_size: DEFAULT_COMPANY_SIZE.to_string(),
            timeline: DEFAULT_TIMELINE.to_string(),
            challenges: vec![ChallengeGoal::default()],
            goals: vec![ChallengeGoal::default()],
            current_tools: String::new(),
        }
    }
}

impl ChecklistForm {
    pub fn collect(&self, catalog: &DiscoveryCatalog) -> Result<PartialProfile, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let company_size = match self.company_size.trim().parse::<u32>() {
            Ok(size) if size > 0 => Some(size),
            _ => {
                errors.push(
                    "companySize",
                    "Please enter a valid company size (must be a positive number).",
                );
                None
            }
        };

        if !catalog.timelines.is_empty() && !catalog.is_timeline(&self.timeline) {
            errors.push(
                "timeline",
                format!("'{}' is not a supported timeline.", self.timeline),
            );
        }

        let challenges: Vec<ChallengeGoal> =
            self.challenges.iter().filter(|c| c.has_title()).cloned().collect();
        let goals: Vec<ChallengeGoal> = self.goals.iter().filter(|g| g.has_title()).cloned().collect();

        if challenges.is_empty() && goals.is_empty() {
            errors.push("lists", "Please define at least one challenge or goal.");
        }

        errors.into_result()?;

        Ok(PartialProfile {
            company_size,
            timeline: Some(self.timeline.clone()),
            challenges: Some(challenges),
            goals: Some(goals),
            current_tools: Some(self.current_tools.clone()),
            notes: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> DiscoveryCatalog {
        DiscoveryCatalog::builtin().unwrap()
    }

    fn form(size: &str) -> ChecklistForm {
        ChecklistForm {
            company_size: size.to_string(),
            challenges: vec![ChallengeGoal::new("Lead tracking", "")],
            goals: vec![],
            ..Default::default()
        }
    }

    #[test]
    fn zero_company_size_is_rejected() {
        let err = form("0").collect(&catalog()).unwrap_err();
        assert!(err.get("companySize").is_some());
    }

    #[test]
    fn non_numeric_company_size_is_rejected() {
        for raw in ["abc", "", "-5", "12.5"] {
            let err = form(raw).collect(&catalog()).unwrap_err();
            assert!(err.get("companySize").is_some(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn emits_filtered_profile() {
        let mut input = form("50");
        input.challenges.push(ChallengeGoal::new("  ", "ignored"));
        let partial = input.collect(&catalog()).unwrap();

        assert_eq!(partial.company_size, Some(50));
        let challenges = partial.challenges.unwrap();
        assert_eq!(challenges.len(), 1);
        assert_eq!(challenges[0].title, "Lead tracking");
        assert_eq!(partial.goals, Some(vec![]));
        assert_eq!(partial.timeline.as_deref(), Some("3-6 months"));
        assert!(partial.notes.is_none());
    }

    #[test]
    fn goal_alone_is_enough() {
        let input = ChecklistForm {
            goals: vec![ChallengeGoal::new("Expand to EU", "")],
            ..Default::default()
        };
        let partial = input.collect(&catalog()).unwrap();
        assert_eq!(partial.challenges, Some(vec![]));
        assert_eq!(partial.goals.unwrap().len(), 1);
    }

    #[test]
    fn empty_lists_are_rejected_with_every_error() {
        let input = ChecklistForm {
            company_size: "0".into(),
            ..Default::default()
        };
        let err = input.collect(&catalog()).unwrap_err();
        assert!(err.get("lists").is_some());
        assert!(err.get("companySize").is_some());
    }

    #[test]
    fn unknown_timeline_is_rejected() {
        let mut input = form("5");
        input.timeline = "someday".into();
        let err = input.collect(&catalog()).unwrap_err();
        assert!(err.get("timeline").is_some());
    }
}
