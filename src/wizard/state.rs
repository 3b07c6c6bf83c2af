//! Wizard state machine: tracks which step the user is in and which
//! generation request is allowed to commit.

use serde::{Deserialize, Serialize};

use crate::collectors::InputMode;
use crate::error::WizardError;
use crate::profile::{CustomerProfile, IndustrySelection, PartialProfile, Proposal};

/// The steps of the proposal wizard.
///
/// Forward: SelectIndustry → SelectInputMode → InputData → Generating →
/// ProposalReady. Every step except SelectIndustry can go back one step,
/// with ProposalReady going back to InputData.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    SelectIndustry,
    SelectInputMode,
    InputData,
    Generating,
    ProposalReady,
}

impl WizardStep {
    /// The step `back` leads to, if any.
    pub fn previous(&self) -> Option<WizardStep> {
        use WizardStep::*;
        match self {
            SelectIndustry => None,
            SelectInputMode => Some(SelectIndustry),
            InputData => Some(SelectInputMode),
            Generating => Some(InputData),
            ProposalReady => Some(InputData),
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::SelectIndustry => "select_industry",
            Self::SelectInputMode => "select_input_mode",
            Self::InputData => "input_data",
            Self::Generating => "generating",
            Self::ProposalReady => "proposal_ready",
        };
        write!(f, "{s}")
    }
}

/// A generation request created by a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub id: u64,
    pub profile: CustomerProfile,
}

/// What happened to a gateway outcome handed to [`WizardState::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Committed,
    /// The request was superseded (back, restart, or a newer submission)
    /// and its outcome was dropped.
    Stale,
}

/// One wizard session's state.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardState {
    step: WizardStep,
    selection: Option<IndustrySelection>,
    mode: Option<InputMode>,
    /// Last submitted collector payload, kept so input survives a failed or
    /// abandoned generation.
    draft: Option<PartialProfile>,
    proposal: Option<Proposal>,
    error: Option<String>,
    /// Monotonic; only the latest value may commit a result.
    request_counter: u64,
}

impl WizardState {
    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn selection(&self) -> Option<&IndustrySelection> {
        self.selection.as_ref()
    }

    pub fn mode(&self) -> Option<InputMode> {
        self.mode
    }

    pub fn draft(&self) -> Option<&PartialProfile> {
        self.draft.as_ref()
    }

    pub fn proposal(&self) -> Option<&Proposal> {
        self.proposal.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn request_counter(&self) -> u64 {
        self.request_counter
    }

    /// The request id eligible to commit. Only set while generating.
    pub fn active_request(&self) -> Option<u64> {
        (self.step == WizardStep::Generating).then_some(self.request_counter)
    }

    pub fn select_industry(&mut self, selection: IndustrySelection) -> Result<(), WizardError> {
        self.expect_step(WizardStep::SelectIndustry, "select an industry")?;
        self.selection = Some(selection);
        self.error = None;
        self.step = WizardStep::SelectInputMode;
        Ok(())
    }

    pub fn choose_mode(&mut self, mode: InputMode) -> Result<(), WizardError> {
        self.expect_step(WizardStep::SelectInputMode, "choose an input mode")?;
        self.mode = Some(mode);
        self.error = None;
        self.step = WizardStep::InputData;
        Ok(())
    }

    /// Whether a payload gathered in `mode` may be submitted right now.
    pub fn accepts(&self, mode: InputMode) -> Result<(), WizardError> {
        self.expect_submittable()?;
        match self.mode {
            Some(expected) if expected != mode => Err(WizardError::ModeMismatch {
                expected: expected.to_string(),
                submitted: mode.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Merge a validated collector payload with the selection and move to
    /// `Generating`. The returned id is the only one that may commit.
    ///
    /// Allowed while a request is already in flight: the newer submission
    /// takes over and the older one becomes stale.
    pub fn begin_submission(
        &mut self,
        partial: PartialProfile,
    ) -> Result<PendingRequest, WizardError> {
        self.expect_submittable()?;
        let Some(selection) = self.selection.as_ref() else {
            return Err(self.rejected("submit"));
        };

        let profile = CustomerProfile::merge(selection, partial.clone());
        self.request_counter += 1;
        self.draft = Some(partial);
        self.error = None;
        self.step = WizardStep::Generating;

        Ok(PendingRequest {
            id: self.request_counter,
            profile,
        })
    }

    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        let previous = self.step.previous().ok_or_else(|| self.rejected("go back"))?;
        match self.step {
            WizardStep::SelectInputMode => {
                self.mode = None;
            }
            WizardStep::InputData => {
                self.mode = None;
                self.draft = None;
            }
            WizardStep::Generating => {
                // Invalidate the in-flight request.
                self.request_counter += 1;
            }
            WizardStep::ProposalReady => {
                self.proposal = None;
            }
            WizardStep::SelectIndustry => {}
        }
        self.error = None;
        self.step = previous;
        Ok(previous)
    }

    /// Apply a gateway outcome. Outcomes for anything but the active
    /// request are dropped without touching state.
    pub fn resolve(&mut self, id: u64, outcome: Result<Proposal, String>) -> Resolution {
        if self.active_request() != Some(id) {
            return Resolution::Stale;
        }
        match outcome {
            Ok(proposal) => {
                self.proposal = Some(proposal);
                self.error = None;
                self.step = WizardStep::ProposalReady;
            }
            Err(message) => {
                self.error = Some(message);
                self.step = WizardStep::InputData;
            }
        }
        Resolution::Committed
    }

    /// Back to the first step with everything cleared. The counter keeps
    /// counting so anything in flight becomes stale.
    pub fn restart(&mut self) {
        let request_counter = self.request_counter + 1;
        *self = Self {
            request_counter,
            ..Self::default()
        };
    }

    fn expect_step(&self, step: WizardStep, event: &str) -> Result<(), WizardError> {
        if self.step == step {
            Ok(())
        } else {
            Err(self.rejected(event))
        }
    }

    fn expect_submittable(&self) -> Result<(), WizardError> {
        match self.step {
            WizardStep::InputData | WizardStep::Generating => Ok(()),
            _ => Err(self.rejected("submit")),
        }
    }

    fn rejected(&self, event: &str) -> WizardError {
        WizardError::InvalidTransition {
            step: self.step.to_string(),
            event: event.to_string(),
        }
    }
}
