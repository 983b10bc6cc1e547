use std::fmt::Write;

use chrono::NaiveDate;
use serde::Serialize;

use crate::adherence::{adherence, ADHERENCE_WINDOW_DAYS};
use crate::insights::infer;
use crate::models::{Adherence, Insight, Record, TagStat, WeeklyComparison};
use crate::tags::correlate;
use crate::trend::{compare, weekly_alert};
use crate::window::{records_for_owner, sort_chronological};

pub const CHART_ENTRIES: usize = 30;

/// Everything the engine derives for one person on one day.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub owner: String,
    pub as_of: NaiveDate,
    pub record_count: usize,
    pub weekly: WeeklyComparison,
    pub weekly_delta: Option<f64>,
    pub alert: Option<String>,
    pub tags: Vec<TagStat>,
    pub insights: Vec<Insight>,
    pub adherence: Adherence,
}

pub fn build_summary(owner: &str, records: &[Record], as_of: NaiveDate) -> Summary {
    let records = records_for_owner(records, owner);
    let weekly = compare(&records, as_of);
    Summary {
        owner: owner.to_string(),
        as_of,
        record_count: records.len(),
        weekly,
        weekly_delta: weekly.delta(),
        alert: weekly_alert(&weekly),
        tags: correlate(&records),
        insights: infer(&records),
        adherence: adherence(&records, as_of),
    }
}

fn fmt_avg(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{value:.1}"),
        None => "not enough data".to_string(),
    }
}

pub fn build_report(summary: &Summary, records: &[Record]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Mood Tracker Report");
    let _ = writeln!(
        output,
        "Generated for {} as of {} ({} entries)",
        summary.owner, summary.as_of, summary.record_count
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## This Week vs Last Week");
    let _ = writeln!(output, "- This week: {}", fmt_avg(summary.weekly.current_avg));
    let _ = writeln!(output, "- Last week: {}", fmt_avg(summary.weekly.prior_avg));
    if let Some(delta) = summary.weekly_delta {
        let _ = writeln!(output, "- Change: {delta:+.1}");
    }
    if let Some(alert) = &summary.alert {
        let _ = writeln!(output);
        let _ = writeln!(output, "> {alert}");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Tags");
    if summary.tags.is_empty() {
        let _ = writeln!(output, "No tagged entries yet.");
    } else {
        for stat in &summary.tags {
            let _ = writeln!(
                output,
                "- {}: avg {:.1} across {} entries",
                stat.tag, stat.mean_score, stat.count
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Insights");
    if summary.insights.is_empty() {
        let _ = writeln!(output, "Not enough data for insights yet.");
    } else {
        for insight in &summary.insights {
            let _ = writeln!(output, "- {insight}");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Medication (last {ADHERENCE_WINDOW_DAYS} days)");
    match &summary.adherence {
        Adherence::NotTracked => {
            let _ = writeln!(output, "Medication is not tracked.");
        }
        Adherence::Tracked(stats) => {
            match stats.rate {
                Some(rate) => {
                    let _ = writeln!(
                        output,
                        "- Adherence: {:.0}% ({} taken, {} missed)",
                        rate * 100.0,
                        stats.taken_count,
                        stats.missed_count
                    );
                }
                None => {
                    let _ = writeln!(output, "- No medication entries in this window.");
                }
            }
            if let Some(diff) = stats.score_difference() {
                let _ = writeln!(
                    output,
                    "- Missed days average {diff:+.1} compared with taken days ({} vs {})",
                    fmt_avg(stats.score_without_medication),
                    fmt_avg(stats.score_with_medication)
                );
            }
        }
    }

    let owned = records_for_owner(records, &summary.owner);
    let history = sort_chronological(&owned);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Trend");
    if history.is_empty() {
        let _ = writeln!(output, "No entries recorded yet.");
    } else {
        let _ = writeln!(output, "| Date | Score |");
        let _ = writeln!(output, "| --- | --- |");
        let start = history.len().saturating_sub(CHART_ENTRIES);
        for record in &history[start..] {
            let _ = writeln!(output, "| {} | {} |", record.date, record.score);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Notes");
    let notes: Vec<&&Record> = history
        .iter()
        .rev()
        .filter(|record| record.note.is_some() || record.gratitude.is_some())
        .take(5)
        .collect();
    if notes.is_empty() {
        let _ = writeln!(output, "No notes recorded yet.");
    } else {
        for record in notes {
            let note = record.note.as_deref().unwrap_or("-");
            let _ = write!(output, "- {}: {}", record.date, note);
            let gratitude = record.gratitude_entries();
            if !gratitude.is_empty() {
                let _ = write!(output, " (grateful for {})", gratitude.join(", "));
            }
            let _ = writeln!(output);
        }
    }

    output
}
