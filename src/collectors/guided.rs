//! Guided discovery collector: a fixed list of questions answered in order.

use serde::{Deserialize, Serialize};

use crate::error::ValidationErrors;
use crate::profile::PartialProfile;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidedAnswers {
    /// Answers aligned by index with the catalog questions. Missing trailing
    /// answers count as blank.
    #[serde(default)]
    pub answers: Vec<String>,
}

impl GuidedAnswers {
    pub fn collect(&self, questions: &[String]) -> Result<PartialProfile, ValidationErrors> {
        if self.answers.len() > questions.len() {
            return Err(ValidationErrors::single(
                "answers",
                format!(
                    "Received {} answers for {} questions.",
                    self.answers.len(),
                    questions.len()
                ),
            ));
        }
        if self.answers.iter().all(|a| a.trim().is_empty()) {
            return Err(ValidationErrors::single(
                "answers",
                "Please answer at least one question.",
            ));
        }
        Ok(PartialProfile {
            notes: Some(self.transcript(questions)),
            ..Default::default()
        })
    }

    /// Every question with its answer, unanswered ones included.
    fn transcript(&self, questions: &[String]) -> String {
        questions
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let answer = self.answers.get(i).map(String::as_str).unwrap_or("");
                format!("Q: {q}\nA: {answer}")
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
