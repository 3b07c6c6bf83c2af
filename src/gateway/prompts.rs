//! Consultant prompt, response schema, and response validation.

use serde_json::{Value, json};

use crate::config::BrandConfig;
use crate::error::GatewayError;
use crate::profile::{ChallengeGoal, CustomerProfile, Proposal, ProposalSolution};

/// Build the instruction prompt for one customer profile.
///
/// Meeting notes, when present, replace the challenge and goal lists.
pub fn proposal_prompt(profile: &CustomerProfile, brand: &BrandConfig) -> String {
    let mut prompt = format!(
        "\
You are an expert {suite} sales consultant with deep knowledge of business operations. \
Your task is to generate a personalized, compelling {suite} proposal for a potential client.

**Client Profile:**
- **Industry:** {industry}
- **Sub-Industry:** {sub_industry}
",
        suite = brand.suite,
        industry = profile.industry,
        sub_industry = profile.sub_industry,
    );

    if let Some(size) = profile.company_size {
        prompt.push_str(&format!("- **Company Size:** {size} employees\n"));
    }
    if let Some(timeline) = profile.timeline.as_deref().filter(|t| !t.is_empty()) {
        prompt.push_str(&format!("- **Implementation Timeline:** {timeline}\n"));
    }

    match profile.notes.as_deref().filter(|n| !n.is_empty()) {
        Some(notes) => {
            prompt.push_str(&format!(
                "
**Meeting Notes Analysis:**
Here are the unstructured notes from the sales meeting. Analyze them to understand \
the client's core pain points, goals, and existing toolset.

<notes>
{notes}
</notes>
"
            ));
        }
        None => {
            if !profile.challenges.is_empty() {
                prompt.push_str("\n**Primary Challenges:**\n");
                prompt.push_str(&bullet_list(&profile.challenges));
            }
            if !profile.goals.is_empty() {
                prompt.push_str("\n**Business Goals:**\n");
                prompt.push_str(&bullet_list(&profile.goals));
            }
        }
    }

    if !profile.current_tools.is_empty() {
        prompt.push_str(&format!("\n**Current Tools:** {}\n", profile.current_tools));
    }

    prompt.push_str(&format!(
        "
**Your Task:**
Based on the client's profile, identify their key problems and map them to solutions from \
the {suite} ecosystem. Recommend a set of products from the following list: {products}, \
or the all-in-one {suite} suite if their needs are broad.

**CRITICAL OUTPUT CONSTRAINTS:**
1. **Outcome-Focused, Not Feature-Focused:** For each recommended product, you MUST provide \
2-4 short and clear bullet points describing the BUSINESS OUTCOME. Do NOT list technical features.
2. **Quantify When Possible (in outcomes only):** Use strong, action-oriented language. \
Quantify benefits in the 'outcomes' where it makes sense (e.g., \"Reduce manual data entry by 40%\").
3. **Example of a GOOD outcome:** \"Never miss a sale due to stockouts with real-time inventory tracking.\"
4. **Example of a BAD feature description:** \"Includes inventory management module.\"
5. **Generate a Summary:** After the solutions, provide a concise executive summary explaining \
the synergistic benefits of adopting the recommended services together.
6. **NO NUMBERS IN SUMMARY:** The executive summary MUST NOT contain any percentages or specific \
numerical quantifications. Use qualitative descriptors instead (e.g., \"significantly boost efficiency\").
7. **JSON Format:** The final output MUST be a JSON object that strictly adheres to the provided schema.
",
        suite = brand.suite,
        products = brand.products.join(", "),
    ));

    prompt
}

fn bullet_list(items: &[ChallengeGoal]) -> String {
    items
        .iter()
        .map(|item| {
            if item.description.is_empty() {
                format!("- **{}**\n", item.title)
            } else {
                format!("- **{}**: {}\n", item.title, item.description)
            }
        })
        .collect()
}

/// Structured-output schema sent with every request.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "solutions": {
                "type": "ARRAY",
                "description": "List of recommended services and their business outcomes.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "serviceName": {
                            "type": "STRING",
                            "description": "The name of the recommended service (e.g., \"Zoho CRM\", \"Zoho One\")."
                        },
                        "outcomes": {
                            "type": "ARRAY",
                            "description": "A list of 2-4 short, clear, tangible, outcome-focused bullet points describing the service's benefit for the client.",
                            "items": { "type": "STRING" }
                        }
                    },
                    "required": ["serviceName", "outcomes"]
                }
            },
            "summary": {
                "type": "STRING",
                "description": "A concise executive summary of the synergistic benefits of integrating the recommended services. This summary MUST NOT contain any percentages or specific numerical quantifications."
            }
        },
        "required": ["solutions", "summary"]
    })
}

/// Parse and validate the model's JSON text.
///
/// Unparseable text is `MalformedResponse`; a missing or mistyped required
/// field is `SchemaViolation`.
pub fn parse_proposal(text: &str) -> Result<Proposal, GatewayError> {
    let body = strip_code_fence(text.trim());
    let value: Value =
        serde_json::from_str(body).map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;
    let obj = value
        .as_object()
        .ok_or_else(|| GatewayError::MalformedResponse("expected a JSON object".into()))?;

    let raw_solutions = obj
        .get("solutions")
        .and_then(Value::as_array)
        .ok_or_else(|| schema_violation("solutions"))?;

    let mut solutions = Vec::with_capacity(raw_solutions.len());
    for (i, raw) in raw_solutions.iter().enumerate() {
        let service_name = raw
            .get("serviceName")
            .and_then(Value::as_str)
            .ok_or_else(|| schema_violation(&format!("solutions[{i}].serviceName")))?;
        let outcomes = raw
            .get("outcomes")
            .and_then(Value::as_array)
            .ok_or_else(|| schema_violation(&format!("solutions[{i}].outcomes")))?
            .iter()
            .map(|o| o.as_str().map(String::from))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| schema_violation(&format!("solutions[{i}].outcomes")))?;
        solutions.push(ProposalSolution {
            service_name: service_name.to_string(),
            outcomes,
        });
    }

    let summary = obj
        .get("summary")
        .and_then(Value::as_str)
        .ok_or_else(|| schema_violation("summary"))?;

    Ok(Proposal {
        solutions,
        summary: summary.to_string(),
    })
}

fn schema_violation(field: &str) -> GatewayError {
    GatewayError::SchemaViolation {
        field: field.to_string(),
    }
}

/// Models occasionally wrap JSON in a Markdown fence despite the mime type.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
