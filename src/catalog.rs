//! Discovery catalog: the industry taxonomy, guided questions, and timeline
//! options.
//!
//! This is reference data rather than code: the default ships embedded from
//! `data/catalog.json`, and a replacement file with the same shape can be
//! loaded at startup.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, ValidationErrors};
use crate::profile::IndustrySelection;

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

/// One top-level industry and its allowed sub-industries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Industry {
    pub name: String,
    pub sub_industries: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryCatalog {
    pub industries: Vec<Industry>,
    /// Guided-discovery questions, in presentation order.
    pub questions: Vec<String>,
    /// Checklist timeline options.
    #[serde(default)]
    pub timelines: Vec<String>,
}

impl DiscoveryCatalog {
    /// The catalog compiled into the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Load and validate a catalog file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json(&raw)?;
        tracing::info!(
            path = %path.display(),
            industries = catalog.industries.len(),
            questions = catalog.questions.len(),
            "Loaded discovery catalog"
        );
        Ok(catalog)
    }

    /// Parse and validate catalog JSON.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(raw)?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.industries.is_empty() {
            return Err(CatalogError::Invalid("no industries defined".into()));
        }
        let mut seen = HashSet::new();
        for industry in &self.industries {
            if industry.name.trim().is_empty() {
                return Err(CatalogError::Invalid("industry with empty name".into()));
            }
            if !seen.insert(industry.name.as_str()) {
                return Err(CatalogError::Invalid(format!(
                    "duplicate industry '{}'",
                    industry.name
                )));
            }
            if industry.sub_industries.is_empty() {
                return Err(CatalogError::Invalid(format!(
                    "industry '{}' has no sub-industries",
                    industry.name
                )));
            }
            if industry.sub_industries.iter().any(|s| s.trim().is_empty()) {
                return Err(CatalogError::Invalid(format!(
                    "industry '{}' has an empty sub-industry",
                    industry.name
                )));
            }
        }
        if self.questions.is_empty() {
            return Err(CatalogError::Invalid("no guided questions defined".into()));
        }
        Ok(())
    }

    pub fn sub_industries(&self, industry: &str) -> Option<&[String]> {
        self.industries
            .iter()
            .find(|i| i.name == industry)
            .map(|i| i.sub_industries.as_slice())
    }

    pub fn is_timeline(&self, value: &str) -> bool {
        self.timelines.iter().any(|t| t == value)
    }

    /// Validate an industry pair picked by the user.
    pub fn select(
        &self,
        industry: &str,
        sub_industry: &str,
    ) -> Result<IndustrySelection, ValidationErrors> {
        let industry = industry.trim();
        let sub_industry = sub_industry.trim();

        if industry.is_empty() {
            return Err(ValidationErrors::single("industry", "Please select an industry."));
        }
        let Some(subs) = self.sub_industries(industry) else {
            return Err(ValidationErrors::single(
                "industry",
                format!("Unknown industry '{industry}'."),
            ));
        };
        if sub_industry.is_empty() {
            return Err(ValidationErrors::single(
                "subIndustry",
                "Please select a sub-industry.",
            ));
        }
        if !subs.iter().any(|s| s == sub_industry) {
            return Err(ValidationErrors::single(
                "subIndustry",
                format!("'{sub_industry}' is not a sub-industry of {industry}."),
            ));
        }
        Ok(IndustrySelection::new(industry, sub_industry))
    }
}
