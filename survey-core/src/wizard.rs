//! Wizard controller
//!
//! An explicit state machine over [`Step`]. The visitor may only see the step
//! recorded in [`WizardSession::allowed_step`]; every other request is
//! redirected there. A step advances only when all of its rules pass, and the
//! final step hands back a [`NewResponse`] instead of touching the session,
//! so the caller can persist first and reset afterwards.
//!
//! Steps 5 to 7 form the brand loop: step 6 is shown once per selected brand
//! ("none" excluded), driven by [`WizardSession::loop_cursor`].

use std::collections::BTreeMap;

use serde::Serialize;

use crate::dictionary::{
    brand_display, Brand, Channel, Code, BRANDS, CHANNELS, FREQUENCIES, PERCEPTIONS,
    RATING_LABELS, ROLES, STORE_TYPES,
};
use crate::extras::{BrandAnswers, Extras};
use crate::form::StepForm;
use crate::response::NewResponse;
use crate::session::{Answers, WizardSession};
use crate::step::{Step, Variant};
use crate::validation::{self, FieldError, FEEDBACK_MAX_LEN};
use crate::Result;

/// A brand as shown inside the loop or rating step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoopBrand {
    pub code: Code,
    pub label: String,
}

/// Step-specific data a page needs besides the known answers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepContext {
    Profile {
        roles: &'static [&'static str],
        store_types: &'static [&'static str],
    },
    Satisfaction {
        frequencies: &'static [&'static str],
        store_type: String,
    },
    Perception {
        perceptions: &'static [&'static str],
        is_baby_store: bool,
    },
    Feedback {
        max_length: usize,
        is_last: bool,
    },
    Brands {
        options: &'static [Brand],
        selected: Vec<Code>,
        other_text: Option<String>,
    },
    Channels {
        brand: LoopBrand,
        /// 1-based position of `brand` in the loop
        position: usize,
        count: usize,
        options: &'static [Channel],
        selected: Vec<Code>,
        other_text: String,
    },
    Ratings {
        brands: Vec<LoopBrand>,
        labels: [&'static str; 5],
        ratings: BTreeMap<Code, u8>,
    },
}

/// Everything needed to render one step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepView {
    pub step: Step,
    pub total: u8,
    pub progress: u8,
    pub answers: Answers,
    pub context: StepContext,
    pub errors: Vec<FieldError>,
}

/// Result of displaying a step
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Show(StepView),
    Redirect(Step),
}

/// Result of submitting a step
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Not the visitor's current step; nothing was validated
    Redirect(Step),
    /// At least one rule failed; the session is unchanged
    Invalid(StepView),
    /// Accepted; continue at the given step (step 6 again while looping)
    Advance(Step),
    /// Last step accepted; persist this, then reset the session
    Complete(NewResponse),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Wizard {
    variant: Variant,
}

impl Wizard {
    pub fn new(variant: Variant) -> Self {
        Self { variant }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Resolve a step number from a URL
    pub fn step(&self, n: u8) -> Result<Step> {
        self.variant.step(n)
    }

    /// The step the visitor is allowed to see
    pub fn allowed_step(&self, session: &WizardSession) -> Step {
        session.allowed_step.min(self.variant.last_step())
    }

    /// `None` when `step` may be accessed, otherwise where to send the visitor
    pub fn guard(&self, session: &WizardSession, step: Step) -> Option<Step> {
        let allowed = self.allowed_step(session);
        (allowed != step).then_some(allowed)
    }

    /// Display a step.
    ///
    /// Only mutates the session when step 6 has no brand left to ask about,
    /// in which case the visitor is moved on to the rating step.
    pub fn enter(&self, session: &mut WizardSession, step: Step) -> Entry {
        if let Some(target) = self.guard(session, step) {
            return Entry::Redirect(target);
        }
        if step == Step::Channels && session.loop_exhausted() {
            session.allowed_step = Step::Ratings;
            return Entry::Redirect(Step::Ratings);
        }
        Entry::Show(self.view(session, step, Vec::new()))
    }

    /// Validate and apply a step submission
    pub fn submit(&self, session: &mut WizardSession, step: Step, form: &StepForm) -> Outcome {
        if let Some(target) = self.guard(session, step) {
            return Outcome::Redirect(target);
        }

        match step {
            Step::Profile => match validation::validate_profile(form) {
                Ok(profile) => {
                    session.answers.name = profile.name;
                    session.answers.role = profile.role;
                    session.answers.store_type = profile.store_type;
                    advance(session, Step::Satisfaction)
                }
                Err(errors) => self.invalid(session, step, errors),
            },
            Step::Satisfaction => match validation::validate_satisfaction(form) {
                Ok(answer) => {
                    session.answers.satisfaction = answer.satisfaction.to_string();
                    session.answers.frequency = answer.frequency;
                    advance(session, Step::Perception)
                }
                Err(errors) => self.invalid(session, step, errors),
            },
            Step::Perception => {
                let is_baby_store = session.answers.is_baby_store();
                match validation::validate_perception(form, is_baby_store) {
                    Ok(answer) => {
                        session.answers.brand_perception = answer.brand_perception;
                        session.answers.primary_diaper_brand = answer.primary_diaper_brand;
                        advance(session, Step::Feedback)
                    }
                    Err(errors) => self.invalid(session, step, errors),
                }
            }
            Step::Feedback => match validation::validate_feedback(form) {
                Ok(feedback) if self.variant == Variant::Simple => {
                    let mut answers = session.answers.clone();
                    answers.open_feedback = feedback;
                    Outcome::Complete(NewResponse {
                        answers,
                        extras: Extras::Basic,
                    })
                }
                Ok(feedback) => {
                    session.answers.open_feedback = feedback;
                    advance(session, Step::Brands)
                }
                Err(errors) => self.invalid(session, step, errors),
            },
            Step::Brands => match validation::validate_brands(form) {
                Ok(selection) => {
                    session.brands = BrandAnswers {
                        brand_selection: selection.codes,
                        brand_other_text: selection.other_text,
                        ..Default::default()
                    };
                    session.loop_cursor = 0;
                    advance(session, Step::Channels)
                }
                Err(errors) => self.invalid(session, step, errors),
            },
            Step::Channels => {
                let Some(brand) = session.current_loop_brand() else {
                    return advance(session, Step::Ratings);
                };
                match validation::validate_channels(form) {
                    Ok(choice) => {
                        session.brands.channels_by_brand.insert(brand, choice);
                        session.loop_cursor += 1;
                        if session.loop_exhausted() {
                            advance(session, Step::Ratings)
                        } else {
                            Outcome::Advance(Step::Channels)
                        }
                    }
                    Err(errors) => self.invalid(session, step, errors),
                }
            }
            Step::Ratings => {
                let loop_list = session.loop_list();
                let other_text = session.brands.brand_other_text.as_deref();
                match validation::validate_ratings(form, &loop_list, other_text) {
                    Ok(ratings) => {
                        let mut brands = session.brands.clone();
                        brands.ratings_by_brand = ratings;
                        Outcome::Complete(NewResponse {
                            answers: session.answers.clone(),
                            extras: Extras::BrandLoop(brands),
                        })
                    }
                    Err(error) => self.invalid(session, step, vec![error]),
                }
            }
        }
    }

    /// Rewind to the step before `from_step` without re-validating.
    ///
    /// Never moves the visitor forward. Leaving the rating step re-opens the
    /// last brand of the channel loop, or the brand step when the loop is
    /// empty.
    pub fn back(&self, session: &mut WizardSession, from_step: u8) -> Step {
        let last = self.variant.last_step();
        let requested = Step::from_number(from_step.saturating_sub(1).max(1))
            .unwrap_or(last)
            .min(last);
        let mut target = requested.min(self.allowed_step(session));

        let loop_len = session.loop_list().len();
        if target == Step::Channels {
            if loop_len == 0 {
                // Step 6 would skip straight back to the ratings
                target = Step::Brands;
            } else if session.loop_cursor >= loop_len {
                session.loop_cursor = loop_len - 1;
            }
        }

        session.allowed_step = target;
        target
    }

    pub fn view(&self, session: &WizardSession, step: Step, errors: Vec<FieldError>) -> StepView {
        let total = self.variant.total_steps();
        let progress = (u16::from(step.number() - 1) * 100 / u16::from(total)) as u8;

        StepView {
            step,
            total,
            progress,
            answers: session.answers.clone(),
            context: self.context(session, step),
            errors,
        }
    }

    fn invalid(&self, session: &WizardSession, step: Step, errors: Vec<FieldError>) -> Outcome {
        Outcome::Invalid(self.view(session, step, errors))
    }

    fn context(&self, session: &WizardSession, step: Step) -> StepContext {
        let other_text = session.brands.brand_other_text.as_deref();
        let loop_brand = |code: Code| LoopBrand {
            code,
            label: brand_display(code, other_text),
        };

        match step {
            Step::Profile => StepContext::Profile {
                roles: ROLES,
                store_types: STORE_TYPES,
            },
            Step::Satisfaction => StepContext::Satisfaction {
                frequencies: FREQUENCIES,
                store_type: session.answers.store_type.clone(),
            },
            Step::Perception => StepContext::Perception {
                perceptions: PERCEPTIONS,
                is_baby_store: session.answers.is_baby_store(),
            },
            Step::Feedback => StepContext::Feedback {
                max_length: FEEDBACK_MAX_LEN,
                is_last: self.variant.last_step() == Step::Feedback,
            },
            Step::Brands => StepContext::Brands {
                options: BRANDS,
                selected: session.brands.brand_selection.clone(),
                other_text: session.brands.brand_other_text.clone(),
            },
            Step::Channels => {
                let loop_list = session.loop_list();
                let cursor = session.loop_cursor.min(loop_list.len().saturating_sub(1));
                let code = loop_list.get(cursor).copied().unwrap_or_default();
                let previous = session.brands.channels_by_brand.get(&code);
                StepContext::Channels {
                    brand: loop_brand(code),
                    position: cursor + 1,
                    count: loop_list.len(),
                    options: CHANNELS,
                    selected: previous.map(|c| c.codes.clone()).unwrap_or_default(),
                    other_text: previous.map(|c| c.other.clone()).unwrap_or_default(),
                }
            }
            Step::Ratings => StepContext::Ratings {
                brands: session.loop_list().into_iter().map(loop_brand).collect(),
                labels: RATING_LABELS,
                ratings: session.brands.ratings_by_brand.clone(),
            },
        }
    }
}

fn advance(session: &mut WizardSession, next: Step) -> Outcome {
    session.allowed_step = next;
    Outcome::Advance(next)
}
