//! Step identifiers and survey variants

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One page of the intake wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Step {
    /// Respondent name, role and store type
    Profile = 1,
    /// Satisfaction score and ordering frequency
    Satisfaction = 2,
    /// Brand perception and, for baby stores, the primary brand
    Perception = 3,
    /// Optional free-text feedback
    Feedback = 4,
    /// Multi-select of stocked brands
    Brands = 5,
    /// Purchase channels, repeated once per selected brand
    Channels = 6,
    /// A 1-5 rating for every selected brand
    Ratings = 7,
}

impl Step {
    pub const ALL: [Step; 7] = [
        Step::Profile,
        Step::Satisfaction,
        Step::Perception,
        Step::Feedback,
        Step::Brands,
        Step::Channels,
        Step::Ratings,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.get(usize::from(n).checked_sub(1)?).copied()
    }
}

impl From<Step> for u8 {
    fn from(step: Step) -> Self {
        step.number()
    }
}

impl TryFrom<u8> for Step {
    type Error = Error;

    fn try_from(n: u8) -> Result<Self> {
        Step::from_number(n).ok_or(Error::UnknownStep(n))
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Which flavour of the survey is being served
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Four steps, persisted after the feedback step
    Simple,
    /// Seven steps with the brand loop
    #[default]
    Full,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Simple => "simple",
            Variant::Full => "full",
        }
    }

    pub fn last_step(&self) -> Step {
        match self {
            Variant::Simple => Step::Feedback,
            Variant::Full => Step::Ratings,
        }
    }

    pub fn total_steps(&self) -> u8 {
        self.last_step().number()
    }

    /// Resolve a step number, rejecting steps outside this variant
    pub fn step(&self, n: u8) -> Result<Step> {
        let step = Step::try_from(n)?;
        if step > self.last_step() {
            return Err(Error::StepNotInVariant {
                step: n,
                variant: self.as_str(),
            });
        }
        Ok(step)
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(Variant::Simple),
            "full" => Ok(Variant::Full),
            other => Err(format!("unknown survey variant: {other}")),
        }
    }
}
