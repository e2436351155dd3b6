use crate::types::DeploymentScoped;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingsOptions {
    pub input: Vec<String>,
    #[serde(rename = "model", default, skip_serializing_if = "Option::is_none")]
    pub deployment_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl EmbeddingsOptions {
    pub fn new(deployment_name: impl Into<String>, input: Vec<String>) -> Self {
        Self {
            input,
            deployment_name: Some(deployment_name.into()),
            ..Default::default()
        }
    }
}

impl DeploymentScoped for EmbeddingsOptions {
    fn deployment_name(&self) -> Option<&str> {
        self.deployment_name.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Embeddings {
    #[serde(default)]
    pub data: Vec<EmbeddingItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<EmbeddingsUsage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingItem {
    pub embedding: Vec<f32>,
    pub index: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingsUsage {
    pub prompt_tokens: u32,
    pub total_tokens: u32,
}
