//! Pipeline listing models.
//!
//! A [`PipelineSummary`] is the registry-independent description of one
//! pipeline: everything `list` shows without executing anything.

use serde::{Deserialize, Serialize};

/// Describes a registered pipeline for listings.
///
/// # Example
///
/// ```yaml
/// name: word_counter
/// description: Counts words in a piece of text
/// final-vars:
///   - count_words
/// tags:
///   - text
/// public: true
/// required-inputs:
///   - raw_text
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct PipelineSummary {
    /// Unique name of the pipeline within its registry.
    pub name: String,

    /// Human readable description, if one was provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Output variables the pipeline computes, in request order.
    pub final_vars: Vec<String>,

    /// Free-form labels. Sorted; ordering carries no meaning.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Whether the pipeline is exposed on the command line.
    #[serde(default = "default_public")]
    pub public: bool,

    /// Inputs that must be supplied at execution time.
    #[serde(default)]
    pub required_inputs: Vec<String>,
}

fn default_public() -> bool {
    true
}

impl PipelineSummary {
    /// Description text for display, falling back to a placeholder.
    pub fn display_description(&self) -> &str {
        self.description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or("No description provided")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_description_fallback() {
        let mut summary = PipelineSummary {
            name: "p".to_string(),
            description: None,
            final_vars: vec!["x".to_string()],
            tags: vec![],
            public: true,
            required_inputs: vec![],
        };
        assert_eq!(summary.display_description(), "No description provided");

        summary.description = Some("   ".to_string());
        assert_eq!(summary.display_description(), "No description provided");

        summary.description = Some("Counts words".to_string());
        assert_eq!(summary.display_description(), "Counts words");
    }

    #[test]
    fn test_public_defaults_to_true() {
        let summary: PipelineSummary =
            serde_json::from_str(r#"{"name": "p", "final-vars": ["x"]}"#).expect("valid json");
        assert!(summary.public);
        assert!(summary.tags.is_empty());
        assert!(summary.required_inputs.is_empty());
    }
}
