//! Flexible-schema payload stored next to the scalar answers
//!
//! The shape depends on how many brands the respondent picked, so it is kept
//! as a single JSON document. The `kind` tag tells readers which variant of
//! the wizard produced it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dictionary::{Code, NONE_CODE};
use crate::Result;

/// Channels chosen for one brand during the loop
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelChoice {
    pub codes: Vec<Code>,
    #[serde(default)]
    pub other: String,
}

impl ChannelChoice {
    /// Free text for channel 98, if any was kept
    pub fn other_text(&self) -> Option<&str> {
        if self.other.is_empty() {
            None
        } else {
            Some(&self.other)
        }
    }
}

/// Answers collected by the brand selection, channel loop and rating steps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandAnswers {
    pub brand_selection: Vec<Code>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_other_text: Option<String>,
    #[serde(default)]
    pub channels_by_brand: BTreeMap<Code, ChannelChoice>,
    #[serde(default)]
    pub ratings_by_brand: BTreeMap<Code, u8>,
}

impl BrandAnswers {
    /// Selected brands that get a loop slot, in selection order ("none" removed)
    pub fn loop_list(&self) -> Vec<Code> {
        loop_list(&self.brand_selection)
    }

    pub fn is_selected(&self, code: Code) -> bool {
        self.brand_selection.contains(&code)
    }
}

/// Extension payload of a stored response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Extras {
    /// Four-step survey, nothing beyond the scalar answers
    Basic,
    /// Seven-step survey with the brand loop
    BrandLoop(BrandAnswers),
}

impl Extras {
    pub fn brand_answers(&self) -> Option<&BrandAnswers> {
        match self {
            Extras::Basic => None,
            Extras::BrandLoop(answers) => Some(answers),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

/// Loop list for a selection: every code except "none", order preserved
pub fn loop_list(selection: &[Code]) -> Vec<Code> {
    selection.iter().copied().filter(|c| *c != NONE_CODE).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_stored_document() {
        let json = r#"{
            "kind": "brand_loop",
            "brand_selection": [1, 98],
            "brand_other_text": "Local Co",
            "channels_by_brand": {"1": {"codes": [2], "other": ""}, "98": {"codes": [], "other": ""}},
            "ratings_by_brand": {"1": 4, "98": 3}
        }"#;

        let extras = Extras::from_json(json).unwrap();
        let answers = extras.brand_answers().unwrap();
        assert_eq!(answers.brand_selection, vec![1, 98]);
        assert_eq!(answers.brand_other_text.as_deref(), Some("Local Co"));
        assert_eq!(answers.channels_by_brand[&1].codes, vec![2]);
        assert_eq!(answers.ratings_by_brand[&98], 3);
    }

    #[test]
    fn test_basic_is_tagged() {
        assert_eq!(Extras::Basic.to_json().unwrap(), r#"{"kind":"basic"}"#);
        assert_eq!(Extras::from_json(r#"{"kind":"basic"}"#).unwrap(), Extras::Basic);
    }

    #[test]
    fn test_map_keys_serialize_as_strings() {
        let mut answers = BrandAnswers {
            brand_selection: vec![2],
            ..Default::default()
        };
        answers.ratings_by_brand.insert(2, 5);

        let json = Extras::BrandLoop(answers).to_json().unwrap();
        assert!(json.contains(r#""ratings_by_brand":{"2":5}"#));
    }

    #[test]
    fn test_loop_list_drops_none() {
        assert_eq!(loop_list(&[99]), Vec::<Code>::new());
        assert_eq!(loop_list(&[1, 2, 98]), vec![1, 2, 98]);
    }
}
