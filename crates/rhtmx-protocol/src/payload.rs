use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::Metadata;

/// Redirect outcome of a loader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    pub destination: String,
    #[serde(default)]
    pub permanent: bool,
}

impl Redirect {
    /// Temporary redirect (307)
    pub fn to(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            permanent: false,
        }
    }

    /// Permanent redirect (308)
    pub fn permanent(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            permanent: true,
        }
    }
}

/// Successful data response: `{props, metadata, theme}`
///
/// Field order is part of the wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagePayload {
    #[serde(default = "empty_props")]
    pub props: Value,
    #[serde(default)]
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub theme: Option<String>,
}

fn empty_props() -> Value {
    Value::Object(Default::default())
}

impl PagePayload {
    pub fn new(props: Value) -> Self {
        Self {
            props,
            metadata: None,
            theme: None,
        }
    }
}

/// Body of a data request
///
/// Exactly one shape is ever emitted:
///
/// | Variant | JSON |
/// |---|---|
/// | `Page` | `{"props":..,"metadata":..,"theme":..}` |
/// | `Redirect` | `{"redirect":{"destination":..,"permanent":..}}` |
/// | `NotFound` | `{"notFound":true}` |
/// | `Error` | `{"error":true,"message":..}` |
///
/// Decoding classifies by flag in the order error, redirect, notFound and
/// only then treats the object as a page payload.
#[derive(Debug, Clone, PartialEq)]
pub enum DataPayload {
    Page(PagePayload),
    Redirect(Redirect),
    NotFound,
    Error { message: String },
}

impl DataPayload {
    pub fn error(message: impl Into<String>) -> Self {
        DataPayload::Error {
            message: message.into(),
        }
    }

    /// Classifies an already parsed JSON value
    ///
    /// Returns `None` for anything that is not a JSON object.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut map) = value else {
            return None;
        };

        if map.get("error").and_then(Value::as_bool) == Some(true) {
            let message = map
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return Some(DataPayload::Error { message });
        }

        if let Some(redirect) = map.remove("redirect") {
            return serde_json::from_value(redirect).ok().map(DataPayload::Redirect);
        }

        if map.get("notFound").and_then(Value::as_bool) == Some(true) {
            return Some(DataPayload::NotFound);
        }

        serde_json::from_value(Value::Object(map))
            .ok()
            .map(DataPayload::Page)
    }
}

impl Serialize for DataPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DataPayload::Page(page) => page.serialize(serializer),
            DataPayload::Redirect(redirect) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("redirect", redirect)?;
                map.end()
            }
            DataPayload::NotFound => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("notFound", &true)?;
                map.end()
            }
            DataPayload::Error { message } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("error", &true)?;
                map.serialize_entry("message", message)?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for DataPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        DataPayload::from_value(value).ok_or_else(|| D::Error::custom("unrecognised data payload"))
    }
}
