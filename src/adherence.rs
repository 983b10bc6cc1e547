use chrono::NaiveDate;

use crate::models::{Adherence, AdherenceSummary, Record};
use crate::window::{mean_score, trailing_window};

pub const ADHERENCE_WINDOW_DAYS: i64 = 30;

/// Medication adherence over `(today - 30d, today]`.
pub fn adherence(records: &[Record], today: NaiveDate) -> Adherence {
    if records.iter().all(|record| record.medication_taken.is_none()) {
        return Adherence::NotTracked;
    }

    let window = trailing_window(records, today, ADHERENCE_WINDOW_DAYS);
    let (taken, missed): (Vec<&Record>, Vec<&Record>) = window
        .into_iter()
        .filter(|record| record.medication_taken.is_some())
        .partition(|record| record.medication_taken == Some(true));

    let total = taken.len() + missed.len();
    Adherence::Tracked(AdherenceSummary {
        rate: (total > 0).then(|| taken.len() as f64 / total as f64),
        taken_count: taken.len(),
        missed_count: missed.len(),
        score_with_medication: mean_score(taken.iter().copied()),
        score_without_medication: mean_score(missed.iter().copied()),
    })
}
