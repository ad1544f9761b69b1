//! CSV export of stored responses
//!
//! The column layout is fixed regardless of how many brands a respondent
//! picked:
//!
//! 1. scalar answers,
//! 2. one 0/1 indicator per dictionary brand,
//! 3. all selected brands, space-joined,
//! 4. channels per loop slot, then the brand that occupied each slot,
//! 5. rating per loop slot, then the brand that occupied each slot.
//!
//! Slot `i` holds whatever brand the respondent saw `i`-th in the channel
//! loop, so a spreadsheet can line up "third brand chosen" across rows.
//! There is one slot per ordinary brand; a loop position past the last slot
//! only shows up in the indicator and aggregate columns.

use std::fmt;
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::dictionary::{self, brand_display, channel_display, rating_label, Code, BRANDS};
use crate::extras::BrandAnswers;
use crate::response::StoredResponse;
use crate::Result;

const SCALAR_COLUMNS: [&str; 10] = [
    "id",
    "created_at",
    "name",
    "role",
    "store_type",
    "satisfaction",
    "frequency",
    "brand_perception",
    "primary_diaper_brand",
    "open_feedback",
];

/// How codes are rendered in the export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    /// Raw dictionary codes and rating numbers
    #[default]
    Value,
    /// Human-readable labels
    Text,
}

impl ExportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportMode::Value => "value",
            ExportMode::Text => "text",
        }
    }

    /// Download name reflecting the mode
    pub fn filename(&self) -> String {
        format!("responses_{}.csv", self.as_str())
    }
}

impl fmt::Display for ExportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header row
pub fn header() -> Vec<String> {
    let slots = dictionary::slot_capacity();
    let mut columns: Vec<String> = SCALAR_COLUMNS.iter().map(|c| c.to_string()).collect();

    columns.extend(BRANDS.iter().map(|b| format!("brand_{}", b.code)));
    columns.push("brands_selected".to_string());
    for prefix in [
        "channels_slot",
        "channels_brand_slot",
        "rating_slot",
        "rating_brand_slot",
    ] {
        columns.extend((1..=slots).map(|i| format!("{prefix}_{i}")));
    }
    columns
}

/// Encode one record; the result always has as many cells as [`header`]
pub fn encode_row(record: &StoredResponse, mode: ExportMode) -> Vec<String> {
    let answers = &record.answers;
    let mut row = vec![
        record.id.0.to_string(),
        record.created_at.to_rfc3339(),
        answers.name.clone(),
        answers.role.clone(),
        answers.store_type.clone(),
        answers.satisfaction.clone(),
        answers.frequency.clone(),
        answers.brand_perception.clone(),
        answers.primary_diaper_brand.clone(),
        answers.open_feedback.clone(),
    ];

    let empty = BrandAnswers::default();
    let brands = record.extras.brand_answers().unwrap_or(&empty);
    let other_text = brands.brand_other_text.as_deref();
    let brand_cell = |code: Code| match mode {
        ExportMode::Value => code.to_string(),
        ExportMode::Text => brand_display(code, other_text),
    };

    row.extend(BRANDS.iter().map(|b| {
        let flag = if brands.is_selected(b.code) { "1" } else { "0" };
        flag.to_string()
    }));
    row.push(
        brands
            .brand_selection
            .iter()
            .map(|&code| brand_cell(code))
            .collect::<Vec<_>>()
            .join(" "),
    );

    let slots = dictionary::slot_capacity();
    let loop_list = brands.loop_list();
    let slot = |i: usize| loop_list.get(i).copied();

    row.extend((0..slots).map(|i| {
        slot(i)
            .and_then(|code| brands.channels_by_brand.get(&code))
            .map(|choice| {
                choice
                    .codes
                    .iter()
                    .map(|&c| match mode {
                        ExportMode::Value => c.to_string(),
                        ExportMode::Text => channel_display(c, choice.other_text()),
                    })
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default()
    }));
    row.extend((0..slots).map(|i| slot(i).map(&brand_cell).unwrap_or_default()));

    row.extend((0..slots).map(|i| {
        slot(i)
            .and_then(|code| brands.ratings_by_brand.get(&code))
            .map(|&rating| match mode {
                ExportMode::Value => rating.to_string(),
                ExportMode::Text => rating_label(rating)
                    .map(str::to_string)
                    .unwrap_or_else(|| rating.to_string()),
            })
            .unwrap_or_default()
    }));
    row.extend((0..slots).map(|i| slot(i).map(&brand_cell).unwrap_or_default()));

    row
}

/// Write the header and every record as CSV
pub fn write_csv<W: Write>(writer: W, records: &[StoredResponse], mode: ExportMode) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(header())?;
    for record in records {
        csv.write_record(encode_row(record, mode))?;
    }
    csv.flush()?;
    Ok(())
}

/// Render the whole export in memory
pub fn to_csv_bytes(records: &[StoredResponse], mode: ExportMode) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(&mut buf, records, mode)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::extras::Extras;
    use crate::response::ResponseId;
    use crate::session::Answers;

    fn record(extras: Extras) -> StoredResponse {
        StoredResponse {
            id: ResponseId(7),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap(),
            answers: Answers {
                name: "Ánh Mai".to_string(),
                role: "Owner".to_string(),
                store_type: "Baby Store".to_string(),
                satisfaction: "4".to_string(),
                frequency: "Weekly".to_string(),
                brand_perception: "Agree".to_string(),
                primary_diaper_brand: "Huggies".to_string(),
                open_feedback: String::new(),
            },
            extras,
        }
    }

    fn local_co() -> StoredResponse {
        let extras = Extras::from_json(
            r#"{
                "kind": "brand_loop",
                "brand_selection": [1, 98],
                "brand_other_text": "Local Co",
                "channels_by_brand": {"1": {"codes": [2], "other": ""}, "98": {"codes": [], "other": ""}},
                "ratings_by_brand": {"1": 4, "98": 3}
            }"#,
        )
        .unwrap();
        record(extras)
    }

    fn cell<'a>(row: &'a [String], column: &str) -> &'a str {
        let index = header()
            .iter()
            .position(|c| c == column)
            .unwrap_or_else(|| panic!("no column {column}"));
        &row[index]
    }

    #[test]
    fn test_header_width_is_fixed() {
        let columns = header();
        let slots = dictionary::slot_capacity();
        assert_eq!(slots, 8);
        assert_eq!(columns.len(), 53);
        assert_eq!(columns.len(), 10 + BRANDS.len() + 1 + 4 * slots);
        assert!(!columns.contains(&"rating_brand_slot_9".to_string()));
        assert_eq!(columns[0], "id");
        assert_eq!(columns[10], "brand_1");
        assert!(columns.contains(&"brand_99".to_string()));
        assert_eq!(columns.last().unwrap(), &format!("rating_brand_slot_{slots}"));
    }

    #[test]
    fn test_text_mode_labels() {
        let row = encode_row(&local_co(), ExportMode::Text);
        assert_eq!(row.len(), header().len());

        assert_eq!(cell(&row, "brands_selected"), "Huggies Local Co");
        assert_eq!(cell(&row, "channels_slot_1"), "Facebook");
        assert_eq!(cell(&row, "channels_brand_slot_1"), "Huggies");
        assert_eq!(cell(&row, "channels_slot_2"), "");
        assert_eq!(cell(&row, "channels_brand_slot_2"), "Local Co");
        assert_eq!(cell(&row, "rating_slot_1"), "Tốt");
        assert_eq!(cell(&row, "rating_slot_2"), "Trung bình");
        assert_eq!(cell(&row, "rating_brand_slot_2"), "Local Co");
        assert_eq!(cell(&row, "rating_slot_3"), "");
    }

    #[test]
    fn test_value_mode_codes() {
        let row = encode_row(&local_co(), ExportMode::Value);

        assert_eq!(cell(&row, "brand_1"), "1");
        assert_eq!(cell(&row, "brand_2"), "0");
        assert_eq!(cell(&row, "brand_98"), "1");
        assert_eq!(cell(&row, "brands_selected"), "1 98");
        assert_eq!(cell(&row, "channels_slot_1"), "2");
        assert_eq!(cell(&row, "channels_brand_slot_2"), "98");
        assert_eq!(cell(&row, "rating_slot_2"), "3");
        assert_eq!(cell(&row, "created_at"), "2024-05-01T08:30:00+00:00");
    }

    #[test]
    fn test_other_without_text_falls_back() {
        let mut answers = BrandAnswers {
            brand_selection: vec![98],
            ..Default::default()
        };
        answers.channels_by_brand.insert(
            98,
            crate::extras::ChannelChoice {
                codes: vec![98],
                other: String::new(),
            },
        );
        let row = encode_row(&record(Extras::BrandLoop(answers)), ExportMode::Text);
        assert_eq!(cell(&row, "brands_selected"), "Other");
        assert_eq!(cell(&row, "channels_slot_1"), "Other");
    }

    #[test]
    fn test_none_never_gets_a_slot() {
        let answers = BrandAnswers {
            brand_selection: vec![99],
            ..Default::default()
        };
        let row = encode_row(&record(Extras::BrandLoop(answers)), ExportMode::Text);
        assert_eq!(cell(&row, "brand_99"), "1");
        assert_eq!(cell(&row, "brands_selected"), "None");
        assert_eq!(cell(&row, "channels_brand_slot_1"), "");
        assert_eq!(cell(&row, "rating_brand_slot_1"), "");
    }

    #[test]
    fn test_loop_longer_than_slots_keeps_width() {
        let mut answers = BrandAnswers {
            brand_selection: vec![1, 2, 3, 4, 5, 6, 7, 8, 98],
            brand_other_text: Some("Local Co".to_string()),
            ..Default::default()
        };
        for code in answers.brand_selection.clone() {
            answers.ratings_by_brand.insert(code, 5);
        }
        let row = encode_row(&record(Extras::BrandLoop(answers)), ExportMode::Text);

        assert_eq!(row.len(), header().len());
        assert_eq!(cell(&row, "brand_98"), "1");
        assert!(cell(&row, "brands_selected").ends_with("Caryn Local Co"));
        assert_eq!(cell(&row, "rating_brand_slot_8"), "Caryn");
    }

    #[test]
    fn test_basic_record_has_empty_blocks() {
        let row = encode_row(&record(Extras::Basic), ExportMode::Value);
        assert_eq!(row.len(), header().len());
        assert_eq!(cell(&row, "brand_1"), "0");
        assert_eq!(cell(&row, "brands_selected"), "");
        assert_eq!(cell(&row, "name"), "Ánh Mai");
    }

    #[test]
    fn test_write_csv_quotes_and_utf8() {
        let mut response = local_co();
        response.answers.open_feedback = "Giá tốt, giao nhanh".to_string();

        let bytes = to_csv_bytes(&[response], ExportMode::Text).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("id,created_at,name"));
        let row = lines.next().unwrap();
        assert!(row.contains("\"Giá tốt, giao nhanh\""));
        assert!(row.contains("Huggies Local Co"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_mode_parsing() {
        let mode: ExportMode = serde_json::from_str(r#""text""#).unwrap();
        assert_eq!(mode, ExportMode::Text);
        assert_eq!(ExportMode::default(), ExportMode::Value);
        assert!(serde_json::from_str::<ExportMode>(r#""labels""#).is_err());
        assert_eq!(ExportMode::Text.filename(), "responses_text.csv");
    }
}
