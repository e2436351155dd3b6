//! Streaming wrapper envelope.
//!
//! Request option types do not carry a `stream` field; streaming calls wrap the caller's
//! body in [`StreamingRequest`], which serializes the body generically and then merges
//! the streaming keys into the resulting object.

use serde::ser::{Error as _, Serialize, Serializer};
use serde_json::{Map, Value};

/// Extra options for streamed responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamOptions {
    /// Ask the service to send a final chunk carrying token usage.
    pub include_usage: bool,
}

/// Wraps any serializable body and injects `stream` (and optionally `stream_options`).
///
/// Injected keys overwrite same-named keys of the inner body.
#[derive(Debug, Clone)]
pub struct StreamingRequest<'a, T: ?Sized> {
    inner: &'a T,
    stream: bool,
    stream_options: Option<StreamOptions>,
}

impl<'a, T: Serialize + ?Sized> StreamingRequest<'a, T> {
    pub fn new(inner: &'a T) -> Self {
        Self {
            inner,
            stream: true,
            stream_options: None,
        }
    }

    pub fn with_stream_options(mut self, options: Option<StreamOptions>) -> Self {
        self.stream_options = options;
        self
    }

    /// Merged JSON object.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        let mut map = match serde_json::to_value(self.inner)? {
            Value::Object(map) => map,
            other => {
                return Err(serde_json::Error::custom(format!(
                    "streaming body must serialize to a JSON object, got {}",
                    json_kind(&other)
                )))
            }
        };
        map.insert("stream".to_string(), Value::Bool(self.stream));
        if let Some(opts) = self.stream_options {
            let mut nested = Map::new();
            nested.insert("include_usage".to_string(), Value::Bool(opts.include_usage));
            map.insert("stream_options".to_string(), Value::Object(nested));
        }
        Ok(Value::Object(map))
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.to_value()?)
    }
}

impl<'a, T: Serialize + ?Sized> Serialize for StreamingRequest<'a, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value()
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
