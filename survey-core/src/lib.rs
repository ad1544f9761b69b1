//! Retailer Survey Core Library
//!
//! The parts of the survey that do not care about HTTP or storage:
//! - Dictionary tables for brands, channels and rating labels
//! - The wizard state machine with its per-step validation and brand loop
//! - The tagged extras payload stored with every response
//! - CSV export in code or label form, and dashboard aggregates

pub mod dictionary;
pub mod error;
pub mod export;
pub mod extras;
pub mod form;
pub mod response;
pub mod session;
pub mod stats;
pub mod step;
pub mod validation;
pub mod wizard;

pub use error::Error;
pub use export::ExportMode;
pub use extras::{BrandAnswers, ChannelChoice, Extras};
pub use form::StepForm;
pub use response::{NewResponse, ResponseId, StoredResponse};
pub use session::{Answers, WizardSession};
pub use stats::DashboardSummary;
pub use step::{Step, Variant};
pub use validation::FieldError;
pub use wizard::{Entry, Outcome, StepContext, StepView, Wizard};

/// Result type for survey-core operations
pub type Result<T> = std::result::Result<T, Error>;
