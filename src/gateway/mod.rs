//! Remote generation gateway: turns a customer profile into a proposal.
//!
//! The wizard only depends on the [`ProposalGateway`] trait. The production
//! implementation is [`GeminiGateway`], which fills the consultant prompt from
//! [`prompts`] and validates the structured response.

pub mod gemini;
pub mod prompts;

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::profile::{CustomerProfile, Proposal};

pub use gemini::GeminiGateway;

/// A single request/response call that produces a proposal.
///
/// Implementations report every failure (transport, malformed body, missing
/// fields) as a [`GatewayError`]; callers never retry.
#[async_trait]
pub trait ProposalGateway: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    async fn generate(&self, profile: &CustomerProfile) -> Result<Proposal, GatewayError>;
}
