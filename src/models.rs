use std::fmt;

use chrono::{NaiveDate, Weekday};
use serde::Serialize;

use crate::error::{MoodError, MoodResult};

pub const TAG_SEPARATOR: &str = ", ";
pub const GRATITUDE_SEPARATOR: &str = " | ";
pub const MAX_GRATITUDE_ENTRIES: usize = 3;

/// Tags describing things that tend to make a day harder.
pub const TRIGGER_TAGS: &[&str] = &[
    "period/pms",
    "poor sleep",
    "missed medication",
    "physical discomfort",
    "work stress",
    "interpersonal conflict",
    "bad weather",
    "unexplained anxiety",
    "apathy/emptiness",
];

/// Tags presumed to go along with better (lower) scores.
pub const PROTECTIVE_TAGS: &[&str] = &[
    "exercise",
    "good sleep",
    "time outdoors",
    "social connection",
    "meditation",
    "creative hobby",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreScale {
    /// 0-20 symptom severity, lower is better.
    #[default]
    Severity,
    /// 1-10 quick check-in.
    Simple,
}

impl ScoreScale {
    pub fn bounds(self) -> (u8, u8) {
        match self {
            ScoreScale::Severity => (0, 20),
            ScoreScale::Simple => (1, 10),
        }
    }

    pub fn check(self, score: i64) -> MoodResult<u8> {
        let (min, max) = self.bounds();
        if score < i64::from(min) || score > i64::from(max) {
            return Err(MoodError::invalid(
                "score",
                format!("{score} is outside {min}..={max}"),
            ));
        }
        Ok(score as u8)
    }

    pub fn parse(value: &str) -> MoodResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "severity" | "20" => Ok(ScoreScale::Severity),
            "simple" | "10" => Ok(ScoreScale::Simple),
            other => Err(MoodError::Config(format!("unknown score scale '{other}'"))),
        }
    }
}

/// One validated self-report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub owner: String,
    pub date: NaiveDate,
    pub score: u8,
    pub tags: Vec<String>,
    pub note: Option<String>,
    pub gratitude: Option<String>,
    pub medication_taken: Option<bool>,
}

impl Record {
    pub fn gratitude_entries(&self) -> Vec<&str> {
        self.gratitude
            .as_deref()
            .map(|joined| {
                joined
                    .split(GRATITUDE_SEPARATOR)
                    .map(str::trim)
                    .filter(|entry| !entry.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn joined_tags(&self) -> String {
        self.tags.join(TAG_SEPARATOR)
    }
}

/// Unvalidated input for a record, as typed on the command line or read
/// from an import file.
#[derive(Debug, Clone, Default)]
pub struct RecordDraft {
    pub owner: String,
    pub date: String,
    pub score: i64,
    pub tags: Vec<String>,
    pub note: Option<String>,
    pub gratitude: Vec<String>,
    pub medication_taken: Option<bool>,
}

impl RecordDraft {
    pub fn validate(self, scale: ScoreScale) -> MoodResult<Record> {
        let owner = self.owner.trim().to_string();
        if owner.is_empty() {
            return Err(MoodError::invalid("owner", "must not be empty"));
        }

        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|err| MoodError::invalid("date", format!("'{}': {err}", self.date)))?;

        let score = scale.check(self.score)?;

        // A record's tags are a set; first occurrence wins.
        let mut tags: Vec<String> = Vec::with_capacity(self.tags.len());
        for tag in self.tags.iter().map(|tag| tag.trim()) {
            if tag.is_empty() || tags.iter().any(|seen| seen == tag) {
                continue;
            }
            if !is_known_tag(tag) {
                tracing::warn!(tag, "tag is not in the vocabulary");
            }
            tags.push(tag.to_string());
        }

        let gratitude: Vec<&str> = self
            .gratitude
            .iter()
            .map(|entry| entry.trim())
            .filter(|entry| !entry.is_empty())
            .collect();
        if gratitude.len() > MAX_GRATITUDE_ENTRIES {
            return Err(MoodError::invalid(
                "gratitude",
                format!(
                    "has {} entries, at most {MAX_GRATITUDE_ENTRIES} allowed",
                    gratitude.len()
                ),
            ));
        }
        if gratitude.iter().any(|entry| entry.contains(GRATITUDE_SEPARATOR.trim())) {
            return Err(MoodError::invalid(
                "gratitude",
                format!("entries must not contain '{}'", GRATITUDE_SEPARATOR.trim()),
            ));
        }

        Ok(Record {
            owner,
            date,
            score,
            tags,
            note: self
                .note
                .map(|note| note.trim().to_string())
                .filter(|note| !note.is_empty()),
            gratitude: if gratitude.is_empty() {
                None
            } else {
                Some(gratitude.join(GRATITUDE_SEPARATOR))
            },
            medication_taken: self.medication_taken,
        })
    }
}

pub fn is_known_tag(tag: &str) -> bool {
    TRIGGER_TAGS.contains(&tag) || PROTECTIVE_TAGS.contains(&tag)
}

pub fn parse_tags(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_medication(value: &str) -> MoodResult<Option<bool>> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "yes" | "y" | "true" | "taken" | "1" => Ok(Some(true)),
        "no" | "n" | "false" | "missed" | "0" => Ok(Some(false)),
        other => Err(MoodError::invalid(
            "medication_taken",
            format!("'{other}' is not a yes/no value"),
        )),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeeklyComparison {
    pub current_avg: Option<f64>,
    pub prior_avg: Option<f64>,
}

impl WeeklyComparison {
    /// Signed change from last week to this week; positive means worse.
    pub fn delta(&self) -> Option<f64> {
        match (self.current_avg, self.prior_avg) {
            (Some(current), Some(prior)) => Some(current - prior),
            _ => None,
        }
    }

    pub fn is_worsening(&self) -> bool {
        self.delta().is_some_and(|delta| delta > 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagStat {
    pub tag: String,
    pub mean_score: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Rising,
    Improving,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Insight {
    DayPattern {
        worst_day: Weekday,
        worst_mean: f64,
        best_day: Weekday,
        best_mean: f64,
    },
    Trend {
        direction: TrendDirection,
        recent_mean: f64,
        previous_mean: f64,
    },
    Warning {
        recent_mean: f64,
    },
    TagInsight {
        tag: String,
        count: usize,
        mean_score: f64,
    },
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Insight::DayPattern {
                worst_day,
                worst_mean,
                best_day,
                best_mean,
            } => write!(
                f,
                "{} tends to be your hardest day (avg {worst_mean:.1}), {} your easiest (avg {best_mean:.1}).",
                weekday_name(*worst_day),
                weekday_name(*best_day)
            ),
            Insight::Trend {
                direction: TrendDirection::Rising,
                recent_mean,
                previous_mean,
            } => write!(
                f,
                "Your scores are rising: last 7 entries avg {recent_mean:.1} vs {previous_mean:.1} before."
            ),
            Insight::Trend {
                direction: TrendDirection::Improving,
                recent_mean,
                previous_mean,
            } => write!(
                f,
                "You're improving: last 7 entries avg {recent_mean:.1} vs {previous_mean:.1} before."
            ),
            Insight::Warning { recent_mean } => write!(
                f,
                "Your last 5 entries average {recent_mean:.1}. Please consider reaching out to someone you trust or a professional."
            ),
            Insight::TagInsight {
                tag,
                count,
                mean_score,
            } => write!(
                f,
                "Days with '{tag}' average {mean_score:.1} across {count} entries. Keep it up."
            ),
        }
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdherenceSummary {
    pub rate: Option<f64>,
    pub taken_count: usize,
    pub missed_count: usize,
    pub score_with_medication: Option<f64>,
    pub score_without_medication: Option<f64>,
}

impl AdherenceSummary {
    /// Missed-mean minus taken-mean, only when both groups have entries.
    pub fn score_difference(&self) -> Option<f64> {
        if self.taken_count == 0 || self.missed_count == 0 {
            return None;
        }
        match (self.score_without_medication, self.score_with_medication) {
            (Some(missed), Some(taken)) => Some(missed - taken),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Adherence {
    NotTracked,
    Tracked(AdherenceSummary),
}
