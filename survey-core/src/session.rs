//! Per-visitor wizard state

use serde::{Deserialize, Serialize};

use crate::dictionary::{Code, BABY_STORE};
use crate::extras::BrandAnswers;
use crate::step::Step;

/// Scalar answers collected by steps 1 through 4
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Answers {
    pub name: String,
    pub role: String,
    pub store_type: String,
    pub satisfaction: String,
    pub frequency: String,
    pub brand_perception: String,
    pub primary_diaper_brand: String,
    pub open_feedback: String,
}

impl Answers {
    pub fn is_baby_store(&self) -> bool {
        self.store_type == BABY_STORE
    }
}

/// Wizard progress of a single visitor.
///
/// Created with `allowed_step = 1` on first contact, mutated only by
/// [`crate::Wizard`], and reset once the response has been persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardSession {
    pub allowed_step: Step,
    #[serde(default)]
    pub answers: Answers,
    #[serde(default)]
    pub brands: BrandAnswers,
    #[serde(default)]
    pub loop_cursor: usize,
}

impl WizardSession {
    pub fn new() -> Self {
        Self {
            allowed_step: Step::Profile,
            answers: Answers::default(),
            brands: BrandAnswers::default(),
            loop_cursor: 0,
        }
    }

    /// Forget everything after a completed submission
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn loop_list(&self) -> Vec<Code> {
        self.brands.loop_list()
    }

    /// Brand the channel loop is currently asking about
    pub fn current_loop_brand(&self) -> Option<Code> {
        self.loop_list().get(self.loop_cursor).copied()
    }

    pub fn loop_exhausted(&self) -> bool {
        self.loop_cursor >= self.loop_list().len()
    }
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new()
    }
}
