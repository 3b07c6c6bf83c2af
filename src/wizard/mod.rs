//! Proposal wizard: the step state machine, per-session controllers, and the
//! HTTP surface.
//!
//! Each session walks SelectIndustry → SelectInputMode → InputData →
//! Generating → ProposalReady. Generation runs in the background; a
//! per-session request counter decides which result, if any, may land.

pub mod controller;
pub mod registry;
pub mod routes;
pub mod state;

pub use controller::{ProposalView, RequestTicket, WizardController, WizardSnapshot};
pub use registry::WizardRegistry;
pub use routes::{AppState, wizard_routes};
pub use state::{PendingRequest, Resolution, WizardState, WizardStep};
