//! Dashboard figures over stored responses

use std::collections::BTreeMap;

use serde::Serialize;

use crate::response::StoredResponse;

/// How many records the dashboard lists
pub const RECENT_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total: usize,
    /// Mean over parseable satisfaction values, two decimals, 0 when none
    pub average_satisfaction: f64,
    pub frequency_counts: BTreeMap<String, usize>,
    pub perception_counts: BTreeMap<String, usize>,
    /// Newest first
    pub recent: Vec<StoredResponse>,
}

impl DashboardSummary {
    /// Recomputed from scratch on every call
    pub fn compute(responses: &[StoredResponse]) -> Self {
        let scores: Vec<u32> = responses
            .iter()
            .filter_map(StoredResponse::satisfaction_score)
            .map(u32::from)
            .collect();
        let average_satisfaction = if scores.is_empty() {
            0.0
        } else {
            let mean = f64::from(scores.iter().sum::<u32>()) / scores.len() as f64;
            (mean * 100.0).round() / 100.0
        };

        let mut recent: Vec<StoredResponse> = responses.to_vec();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        recent.truncate(RECENT_LIMIT);

        Self {
            total: responses.len(),
            average_satisfaction,
            frequency_counts: count_by(responses, |r| &r.answers.frequency),
            perception_counts: count_by(responses, |r| &r.answers.brand_perception),
            recent,
        }
    }
}

fn count_by<F>(responses: &[StoredResponse], field: F) -> BTreeMap<String, usize>
where
    F: Fn(&StoredResponse) -> &String,
{
    let mut counts = BTreeMap::new();
    for value in responses.iter().map(field).filter(|v| !v.is_empty()) {
        *counts.entry(value.clone()).or_insert(0) += 1;
    }
    counts
}
