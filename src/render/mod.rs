//! Proposal renderer: on-screen text and paginated PDF export.
//!
//! Rendering only reads a finished [`Proposal`](crate::profile::Proposal);
//! export failures are reported as [`ExportError`](crate::error::ExportError)
//! and never touch wizard state.

pub mod pdf;
pub mod text;

pub use pdf::{ExportedDocument, export_file_name, render_proposal_pdf};
pub use text::render_proposal;
