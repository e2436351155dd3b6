//! Content filtering annotations attached to prompts, choices and refusals.

use serde::{Deserialize, Serialize};

/// Outcome for a single content filter category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFilterResult {
    pub filtered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

/// Detection result for binary categories (jailbreak, protected material).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFilterDetectionResult {
    pub filtered: bool,
    pub detected: bool,
}

/// Per-category filter results. Categories the service did not evaluate are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFilterResults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hate: Option<ContentFilterResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_harm: Option<ContentFilterResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sexual: Option<ContentFilterResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violence: Option<ContentFilterResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profanity: Option<ContentFilterDetectionResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jailbreak: Option<ContentFilterDetectionResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected_material_text: Option<ContentFilterDetectionResult>,
}

impl ContentFilterResults {
    /// True if any evaluated category was filtered.
    pub fn any_filtered(&self) -> bool {
        [&self.hate, &self.self_harm, &self.sexual, &self.violence]
            .iter()
            .any(|r| r.as_ref().map(|r| r.filtered).unwrap_or(false))
            || [&self.profanity, &self.jailbreak, &self.protected_material_text]
                .iter()
                .any(|r| r.as_ref().map(|r| r.filtered).unwrap_or(false))
    }
}

/// Filter results for one prompt of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptFilterResult {
    pub prompt_index: u32,
    #[serde(default)]
    pub content_filter_results: Option<ContentFilterResults>,
}
