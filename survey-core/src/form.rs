//! Raw submission of a wizard step
//!
//! Every field is optional on the wire; each step only reads the fields it
//! owns. Values are kept as text, the way an HTML form would post them, and
//! are parsed by [`crate::validation`]. JSON numbers and booleans are
//! accepted and turned into their text form.

use std::collections::BTreeMap;

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

use crate::Result;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StepForm {
    #[serde(deserialize_with = "text")]
    pub name: String,
    #[serde(deserialize_with = "text")]
    pub role: String,
    #[serde(deserialize_with = "text")]
    pub store_type: String,
    #[serde(deserialize_with = "text")]
    pub satisfaction: String,
    #[serde(deserialize_with = "text")]
    pub frequency: String,
    #[serde(deserialize_with = "text")]
    pub brand_perception: String,
    #[serde(deserialize_with = "text")]
    pub primary_diaper_brand: String,
    #[serde(deserialize_with = "text")]
    pub open_feedback: String,
    /// Brand codes ticked on the brand step
    #[serde(deserialize_with = "text_list")]
    pub brands: Vec<String>,
    /// Free text for brand 98
    #[serde(deserialize_with = "text")]
    pub brand_other: String,
    /// Channel codes ticked for the brand currently in the loop
    #[serde(deserialize_with = "text_list")]
    pub channels: Vec<String>,
    /// Free text for channel 98
    #[serde(deserialize_with = "text")]
    pub channel_other: String,
    /// Rating per brand, keyed by brand code
    #[serde(deserialize_with = "text_map")]
    pub ratings: BTreeMap<String, String>,
}

impl StepForm {
    /// Build a form from a decoded JSON body. Unknown keys are ignored.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

fn scalar<E: de::Error>(value: Value) -> std::result::Result<String, E> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(E::custom(format!("expected text, found {other}"))),
    }
}

fn text<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    scalar(Value::deserialize(deserializer)?)
}

/// A list of values; a lone value counts as a one-item list
fn text_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().map(scalar).collect(),
        Value::Null => Ok(Vec::new()),
        single => Ok(vec![scalar(single)?]),
    }
}

fn text_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Object(map) => map
            .into_iter()
            .map(|(key, value)| scalar(value).map(|text| (key, text)))
            .collect(),
        Value::Null => Ok(BTreeMap::new()),
        other => Err(de::Error::custom(format!("expected an object, found {other}"))),
    }
}
