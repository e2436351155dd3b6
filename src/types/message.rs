//! Chat request messages, including the string-or-parts user content union.

use base64::Engine as _;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::path::Path;

/// A message in a chat completions request, tagged on the wire by `role`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ChatRequestMessage {
    System {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    User {
        content: UserMessageContent,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    Assistant {
        #[serde(default)]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<crate::types::chat::ToolCall>,
    },
    Tool {
        content: String,
        tool_call_id: String,
    },
}

impl ChatRequestMessage {
    pub fn system(text: impl Into<String>) -> Self {
        ChatRequestMessage::System {
            content: text.into(),
            name: None,
        }
    }

    /// A user message from either plain text or a list of content parts.
    pub fn user(content: impl Into<UserMessageContent>) -> Self {
        ChatRequestMessage::User {
            content: content.into(),
            name: None,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        ChatRequestMessage::Assistant {
            content: Some(text.into()),
            name: None,
            tool_calls: Vec::new(),
        }
    }

    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        ChatRequestMessage::Tool {
            content: content.into(),
            tool_call_id: tool_call_id.into(),
        }
    }
}

/// User message content: a plain string or an ordered list of typed parts.
///
/// Encoded without any wrapper, so the JSON is either `"hello"` or `[{"type":"text",...}]`.
#[derive(Debug, Clone, PartialEq)]
pub enum UserMessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl UserMessageContent {
    pub fn text(text: impl Into<String>) -> Self {
        UserMessageContent::Text(text.into())
    }

    pub fn parts(parts: Vec<ContentPart>) -> Self {
        UserMessageContent::Parts(parts)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            UserMessageContent::Text(s) => Some(s),
            UserMessageContent::Parts(_) => None,
        }
    }

    pub fn as_parts(&self) -> Option<&[ContentPart]> {
        match self {
            UserMessageContent::Text(_) => None,
            UserMessageContent::Parts(p) => Some(p),
        }
    }
}

impl From<String> for UserMessageContent {
    fn from(s: String) -> Self {
        UserMessageContent::Text(s)
    }
}

impl From<&str> for UserMessageContent {
    fn from(s: &str) -> Self {
        UserMessageContent::Text(s.to_string())
    }
}

impl From<Vec<ContentPart>> for UserMessageContent {
    fn from(parts: Vec<ContentPart>) -> Self {
        UserMessageContent::Parts(parts)
    }
}

impl Serialize for UserMessageContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            UserMessageContent::Text(s) => serializer.serialize_str(s),
            UserMessageContent::Parts(parts) => parts.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for UserMessageContent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Classify on the dynamic value: arrays are tried before strings.
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::Array(_) => serde_json::from_value::<Vec<ContentPart>>(value)
                .map(UserMessageContent::Parts)
                .map_err(de::Error::custom),
            serde_json::Value::String(s) => Ok(UserMessageContent::Text(s)),
            other => Err(de::Error::invalid_type(
                unexpected(&other),
                &"a string or an array of content parts",
            )),
        }
    }
}

fn unexpected(v: &serde_json::Value) -> de::Unexpected<'_> {
    match v {
        serde_json::Value::Null => de::Unexpected::Unit,
        serde_json::Value::Bool(b) => de::Unexpected::Bool(*b),
        serde_json::Value::Number(_) => de::Unexpected::Other("number"),
        serde_json::Value::Object(_) => de::Unexpected::Map,
        serde_json::Value::String(s) => de::Unexpected::Str(s),
        serde_json::Value::Array(_) => de::Unexpected::Seq,
    }
}

/// One typed part of a multi-part user message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    /// Either an https URL or a `data:<media-type>;base64,<data>` URL.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<ImageDetail>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    Auto,
    Low,
    High,
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: url.into(),
                detail: None,
            },
        }
    }

    /// Inline image bytes as a base64 data URL.
    pub fn image_base64(bytes: &[u8], media_type: &str) -> Self {
        let data = base64::engine::general_purpose::STANDARD.encode(bytes);
        Self::image_url(format!("data:{};base64,{}", media_type, data))
    }

    pub fn image_from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            crate::Error::validation_with_context(
                format!("cannot read image file: {}", e),
                crate::ErrorContext::new()
                    .with_field_path(path.display().to_string())
                    .with_source("content_part"),
            )
        })?;
        let media_type = guess_media_type(path).unwrap_or("application/octet-stream");
        Ok(Self::image_base64(&bytes, media_type))
    }

    pub fn with_detail(self, detail: ImageDetail) -> Self {
        match self {
            ContentPart::ImageUrl { image_url } => ContentPart::ImageUrl {
                image_url: ImageUrl {
                    detail: Some(detail),
                    ..image_url
                },
            },
            other => other,
        }
    }
}

fn guess_media_type(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();
    let mt = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => return None,
    };
    Some(mt)
}
