//! Proposal Wizard: turns sales discovery into an AI-generated, exportable
//! proposal.

pub mod catalog;
pub mod collectors;
pub mod config;
pub mod error;
pub mod gateway;
pub mod profile;
pub mod render;
pub mod wizard;
