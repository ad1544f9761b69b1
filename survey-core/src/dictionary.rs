//! Static reference tables: brands, purchase channels and rating labels
//!
//! The ordering of [`BRANDS`] is significant: export columns are numbered
//! from it, so new brands must be appended before the reserved codes.

use serde::Serialize;

/// Dictionary code of a brand or channel
pub type Code = u16;

/// Reserved code for "other" (free text supplied by the respondent)
pub const OTHER_CODE: Code = 98;

/// Reserved code for "none" (exclusive with every other brand)
pub const NONE_CODE: Code = 99;

/// Fallback label for the "other" code when no free text was given
pub const OTHER_LABEL: &str = "Other";

/// A diaper brand the respondent may stock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Brand {
    pub code: Code,
    pub key: &'static str,
    pub label: &'static str,
}

impl Brand {
    /// Whether this is one of the reserved codes (98/99)
    pub fn is_reserved(&self) -> bool {
        self.code == OTHER_CODE || self.code == NONE_CODE
    }
}

/// A channel through which the retailer buys a brand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Channel {
    pub code: Code,
    pub label: &'static str,
}

pub const BRANDS: &[Brand] = &[
    Brand { code: 1, key: "huggies", label: "Huggies" },
    Brand { code: 2, key: "pampers", label: "Pampers" },
    Brand { code: 3, key: "bobby", label: "Bobby" },
    Brand { code: 4, key: "merries", label: "Merries" },
    Brand { code: 5, key: "moony", label: "Moony" },
    Brand { code: 6, key: "goon", label: "Goo.n" },
    Brand { code: 7, key: "molfix", label: "Molfix" },
    Brand { code: 8, key: "caryn", label: "Caryn" },
    Brand { code: OTHER_CODE, key: "other", label: OTHER_LABEL },
    Brand { code: NONE_CODE, key: "none", label: "None" },
];

pub const CHANNELS: &[Channel] = &[
    Channel { code: 1, label: "Distributor" },
    Channel { code: 2, label: "Facebook" },
    Channel { code: 3, label: "Zalo" },
    Channel { code: 4, label: "Shopee" },
    Channel { code: 5, label: "TikTok Shop" },
    Channel { code: 6, label: "Wholesale market" },
    Channel { code: OTHER_CODE, label: OTHER_LABEL },
];

/// Qualitative labels for ratings 1 through 5
pub const RATING_LABELS: [&str; 5] = ["Rất kém", "Kém", "Trung bình", "Tốt", "Rất tốt"];

pub const ROLES: &[&str] = &["Owner", "Manager", "Staff"];

pub const STORE_TYPES: &[&str] = &["Grocery", "Pharmacy", "Baby Store", "Other"];

/// Store type that unlocks the primary diaper brand question
pub const BABY_STORE: &str = "Baby Store";

pub const FREQUENCIES: &[&str] = &["Weekly", "Monthly", "Less often"];

pub const PERCEPTIONS: &[&str] = &["Agree", "Neutral", "Disagree"];

pub fn brand(code: Code) -> Option<&'static Brand> {
    BRANDS.iter().find(|b| b.code == code)
}

pub fn channel(code: Code) -> Option<&'static Channel> {
    CHANNELS.iter().find(|c| c.code == code)
}

/// Label for a rating value, `None` outside 1..=5
pub fn rating_label(rating: u8) -> Option<&'static str> {
    match rating {
        1..=5 => Some(RATING_LABELS[usize::from(rating) - 1]),
        _ => None,
    }
}

/// Number of ordinary (non-reserved) brands.
///
/// This is the number of slots in the per-position export blocks. A loop
/// longer than this (every ordinary brand plus "other") has no column for
/// its last position.
pub fn slot_capacity() -> usize {
    BRANDS.iter().filter(|b| !b.is_reserved()).count()
}

/// Label for a brand code, substituting the respondent's text for "other"
pub fn brand_display(code: Code, other_text: Option<&str>) -> String {
    if code == OTHER_CODE {
        return other_or_default(other_text);
    }
    brand(code)
        .map(|b| b.label.to_string())
        .unwrap_or_else(|| code.to_string())
}

/// Label for a channel code, substituting the respondent's text for "other"
pub fn channel_display(code: Code, other_text: Option<&str>) -> String {
    if code == OTHER_CODE {
        return other_or_default(other_text);
    }
    channel(code)
        .map(|c| c.label.to_string())
        .unwrap_or_else(|| code.to_string())
}

fn other_or_default(text: Option<&str>) -> String {
    match text.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => OTHER_LABEL.to_string(),
    }
}
