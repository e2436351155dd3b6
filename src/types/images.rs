use crate::types::content_filter::ContentFilterResults;
use crate::types::DeploymentScoped;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageGenerationOptions {
    pub prompt: String,
    #[serde(rename = "model", default, skip_serializing_if = "Option::is_none")]
    pub deployment_name: Option<String>,
    #[serde(rename = "n", default, skip_serializing_if = "Option::is_none")]
    pub image_count: Option<u32>,
    /// e.g. `1024x1024`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    /// `url` or `b64_json`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<String>,
}

impl ImageGenerationOptions {
    pub fn new(deployment_name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            deployment_name: Some(deployment_name.into()),
            ..Default::default()
        }
    }
}

impl DeploymentScoped for ImageGenerationOptions {
    fn deployment_name(&self) -> Option<&str> {
        self.deployment_name.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageGenerations {
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub data: Vec<ImageGenerationData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageGenerationData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b64_json: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revised_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_filter_results: Option<ContentFilterResults>,
}
