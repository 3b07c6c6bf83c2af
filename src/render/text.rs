//! Markdown rendering for on-screen viewing.

use crate::config::BrandConfig;
use crate::profile::{IndustrySelection, Proposal};

/// Render a proposal as Markdown. Outcomes and the summary are emitted
/// verbatim.
pub fn render_proposal(
    proposal: &Proposal,
    selection: &IndustrySelection,
    brand: &BrandConfig,
) -> String {
    let mut out = format!(
        "# {}\n\nPrepared for a leader in the {} sector\n",
        brand.title, selection.sub_industry
    );

    for solution in &proposal.solutions {
        out.push_str(&format!("\n## {}\n\n", solution.service_name));
        for outcome in &solution.outcomes {
            out.push_str(&format!("- {outcome}\n"));
        }
    }

    out.push_str(&format!("\n## Executive Summary\n\n{}\n", proposal.summary));
    out
}
