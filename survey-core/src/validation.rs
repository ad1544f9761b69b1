//! Per-step validation rules
//!
//! Each validator returns the cleaned values or every rule that failed, so a
//! step can be re-rendered with all of its messages at once. The rating step
//! is the exception: it stops at the first brand without a valid rating.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::dictionary::{
    self, brand_display, Code, FREQUENCIES, NONE_CODE, OTHER_CODE, PERCEPTIONS, ROLES,
    STORE_TYPES,
};
use crate::extras::ChannelChoice;
use crate::form::StepForm;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w\s\-\.'À-ỹ]+$").expect("valid regex"));

pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 60;
pub const PRIMARY_BRAND_MAX_LEN: usize = 40;
pub const FEEDBACK_MAX_LEN: usize = 500;

/// A violated rule, shown next to the offending field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub type Validated<T> = Result<T, Vec<FieldError>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub role: String,
    pub store_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SatisfactionAnswer {
    pub satisfaction: u8,
    pub frequency: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerceptionAnswer {
    pub brand_perception: String,
    pub primary_diaper_brand: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandSelection {
    /// Codes in dictionary order, without duplicates
    pub codes: Vec<Code>,
    /// Kept only when brand 98 is selected and the text is not blank
    pub other_text: Option<String>,
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Parse an integer the way a form field would be read, then range-check it
fn parse_score(raw: &str) -> Result<u8, ScoreError> {
    let n: i64 = raw.trim().parse().map_err(|_| ScoreError::NotANumber)?;
    match n {
        1..=5 => Ok(n as u8),
        _ => Err(ScoreError::OutOfRange),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScoreError {
    NotANumber,
    OutOfRange,
}

pub fn is_valid_name(name: &str) -> bool {
    (NAME_MIN_LEN..=NAME_MAX_LEN).contains(&char_len(name)) && NAME_RE.is_match(name)
}

/// Step 1
pub fn validate_profile(form: &StepForm) -> Validated<Profile> {
    let name = form.name.trim();
    let role = form.role.trim();
    let store_type = form.store_type.trim();

    let mut errors = Vec::new();
    if !is_valid_name(name) {
        errors.push(FieldError::new("name", "Tên 2–60 ký tự, không chứa ký tự lạ."));
    }
    if !ROLES.contains(&role) {
        errors.push(FieldError::new("role", "Vai trò không hợp lệ."));
    }
    if !STORE_TYPES.contains(&store_type) {
        errors.push(FieldError::new("store_type", "Loại cửa hàng không hợp lệ."));
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(Profile {
        name: name.to_string(),
        role: role.to_string(),
        store_type: store_type.to_string(),
    })
}

/// Step 2
pub fn validate_satisfaction(form: &StepForm) -> Validated<SatisfactionAnswer> {
    let frequency = form.frequency.trim();

    let mut errors = Vec::new();
    let satisfaction = match parse_score(&form.satisfaction) {
        Ok(score) => Some(score),
        Err(ScoreError::OutOfRange) => {
            errors.push(FieldError::new(
                "satisfaction",
                "Mức độ hài lòng phải từ 1 đến 5.",
            ));
            None
        }
        Err(ScoreError::NotANumber) => {
            errors.push(FieldError::new(
                "satisfaction",
                "Mức độ hài lòng phải là số hợp lệ.",
            ));
            None
        }
    };
    if !FREQUENCIES.contains(&frequency) {
        errors.push(FieldError::new("frequency", "Tần suất đặt hàng không hợp lệ."));
    }

    match satisfaction {
        Some(satisfaction) if errors.is_empty() => Ok(SatisfactionAnswer {
            satisfaction,
            frequency: frequency.to_string(),
        }),
        _ => Err(errors),
    }
}

/// Step 3. The primary brand is only checked for baby stores.
pub fn validate_perception(form: &StepForm, is_baby_store: bool) -> Validated<PerceptionAnswer> {
    let brand_perception = form.brand_perception.trim();
    let primary_diaper_brand = form.primary_diaper_brand.trim();

    let mut errors = Vec::new();
    if !PERCEPTIONS.contains(&brand_perception) {
        errors.push(FieldError::new(
            "brand_perception",
            "Cảm nhận thương hiệu không hợp lệ.",
        ));
    }
    if is_baby_store && !(1..=PRIMARY_BRAND_MAX_LEN).contains(&char_len(primary_diaper_brand)) {
        errors.push(FieldError::new(
            "primary_diaper_brand",
            "Vui lòng nhập thương hiệu tã chính (tối đa 40 ký tự).",
        ));
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(PerceptionAnswer {
        brand_perception: brand_perception.to_string(),
        primary_diaper_brand: primary_diaper_brand.to_string(),
    })
}

/// Step 4
pub fn validate_feedback(form: &StepForm) -> Validated<String> {
    let feedback = form.open_feedback.trim();
    if char_len(feedback) > FEEDBACK_MAX_LEN {
        return Err(vec![FieldError::new(
            "open_feedback",
            "Ý kiến thêm tối đa 500 ký tự.",
        )]);
    }
    Ok(feedback.to_string())
}

/// Parse multi-select codes, keeping dictionary order and dropping repeats
fn parse_codes<F>(raw: &[String], known: F) -> Option<Vec<Code>>
where
    F: Fn(Code) -> bool,
{
    let mut codes = Vec::with_capacity(raw.len());
    for value in raw {
        let code: Code = value.trim().parse().ok()?;
        if !known(code) {
            return None;
        }
        if !codes.contains(&code) {
            codes.push(code);
        }
    }
    Some(codes)
}

fn kept_other_text(codes: &[Code], raw: &str) -> Option<String> {
    let text = raw.trim();
    if codes.contains(&OTHER_CODE) && !text.is_empty() {
        Some(text.to_string())
    } else {
        None
    }
}

/// Step 5. "None" must be the only brand when it is ticked.
pub fn validate_brands(form: &StepForm) -> Validated<BrandSelection> {
    let Some(mut codes) = parse_codes(&form.brands, |c| dictionary::brand(c).is_some()) else {
        return Err(vec![FieldError::new("brands", "Thương hiệu không hợp lệ.")]);
    };

    if codes.contains(&NONE_CODE) && codes.len() > 1 {
        return Err(vec![FieldError::new(
            "brands",
            "Không thể chọn \"Không có\" cùng với thương hiệu khác.",
        )]);
    }

    let order = |code: &Code| dictionary::BRANDS.iter().position(|b| b.code == *code);
    codes.sort_by_key(order);

    let other_text = kept_other_text(&codes, &form.brand_other);
    Ok(BrandSelection { codes, other_text })
}

/// Step 6, for one brand of the loop
pub fn validate_channels(form: &StepForm) -> Validated<ChannelChoice> {
    let Some(mut codes) = parse_codes(&form.channels, |c| dictionary::channel(c).is_some()) else {
        return Err(vec![FieldError::new("channels", "Kênh mua hàng không hợp lệ.")]);
    };

    let order = |code: &Code| dictionary::CHANNELS.iter().position(|c| c.code == *code);
    codes.sort_by_key(order);

    let other = kept_other_text(&codes, &form.channel_other).unwrap_or_default();
    Ok(ChannelChoice { codes, other })
}

/// Step 7. All-or-nothing: the first brand without a valid rating fails the
/// whole submission.
pub fn validate_ratings(
    form: &StepForm,
    loop_list: &[Code],
    brand_other_text: Option<&str>,
) -> Result<BTreeMap<Code, u8>, FieldError> {
    let mut ratings = BTreeMap::new();
    for &code in loop_list {
        let raw = form
            .ratings
            .get(&code.to_string())
            .map(String::as_str)
            .unwrap_or("");
        match parse_score(raw) {
            Ok(score) => {
                ratings.insert(code, score);
            }
            Err(_) => {
                let label = brand_display(code, brand_other_text);
                return Err(FieldError::new(
                    "ratings",
                    format!("Vui lòng chấm điểm {label} từ 1 đến 5."),
                ));
            }
        }
    }
    Ok(ratings)
}
