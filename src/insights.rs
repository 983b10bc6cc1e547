use std::collections::BTreeMap;

use chrono::{Datelike, Weekday};

use crate::models::{Insight, Record, TrendDirection, PROTECTIVE_TAGS};
use crate::tags::correlate;
use crate::window::{mean_score, sort_chronological};

pub const MIN_RECORDS_FOR_INSIGHTS: usize = 7;
pub const MIN_DISTINCT_WEEKDAYS: usize = 3;
pub const DAY_PATTERN_MIN_SPREAD: f64 = 2.0;
pub const TREND_WINDOW: usize = 7;
pub const TREND_MIN_RECORDS: usize = TREND_WINDOW * 2;
pub const TREND_MIN_SHIFT: f64 = 2.0;
pub const WARNING_WINDOW: usize = 5;
pub const WARNING_THRESHOLD: f64 = 15.0;
pub const PROTECTIVE_TAG_MIN_COUNT: usize = 3;

/// A single threshold heuristic over one person's history.
///
/// `history` is always sorted oldest first.
pub trait InsightRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn evaluate(&self, history: &[&Record]) -> Option<Insight>;
}

pub struct DayOfWeekRule;

impl InsightRule for DayOfWeekRule {
    fn name(&self) -> &'static str {
        "day_pattern"
    }

    fn evaluate(&self, history: &[&Record]) -> Option<Insight> {
        let mut by_day: BTreeMap<u32, (Weekday, u64, usize)> = BTreeMap::new();
        for record in history {
            let weekday = record.date.weekday();
            let entry = by_day
                .entry(weekday.num_days_from_monday())
                .or_insert((weekday, 0, 0));
            entry.1 += u64::from(record.score);
            entry.2 += 1;
        }

        if by_day.len() < MIN_DISTINCT_WEEKDAYS {
            return None;
        }

        let means: Vec<(Weekday, f64)> = by_day
            .into_values()
            .map(|(weekday, total, count)| (weekday, total as f64 / count as f64))
            .collect();

        let mut worst = means[0];
        let mut best = means[0];
        for &(weekday, mean) in &means[1..] {
            if mean > worst.1 {
                worst = (weekday, mean);
            }
            if mean < best.1 {
                best = (weekday, mean);
            }
        }

        if worst.1 - best.1 < DAY_PATTERN_MIN_SPREAD {
            return None;
        }

        Some(Insight::DayPattern {
            worst_day: worst.0,
            worst_mean: worst.1,
            best_day: best.0,
            best_mean: best.1,
        })
    }
}

pub struct RecentTrendRule;

impl InsightRule for RecentTrendRule {
    fn name(&self) -> &'static str {
        "trend"
    }

    fn evaluate(&self, history: &[&Record]) -> Option<Insight> {
        let len = history.len();
        if len < TREND_MIN_RECORDS {
            return None;
        }

        let recent_mean = mean_score(history[len - TREND_WINDOW..].iter().copied())?;
        let previous_mean =
            mean_score(history[len - TREND_MIN_RECORDS..len - TREND_WINDOW].iter().copied())?;
        let shift = recent_mean - previous_mean;
        if shift.abs() < TREND_MIN_SHIFT {
            return None;
        }

        let direction = if shift > 0.0 {
            TrendDirection::Rising
        } else {
            TrendDirection::Improving
        };
        Some(Insight::Trend {
            direction,
            recent_mean,
            previous_mean,
        })
    }
}

pub struct SustainedHighRule;

impl InsightRule for SustainedHighRule {
    fn name(&self) -> &'static str {
        "warning"
    }

    fn evaluate(&self, history: &[&Record]) -> Option<Insight> {
        if history.len() < WARNING_WINDOW {
            return None;
        }
        let recent_mean = mean_score(history[history.len() - WARNING_WINDOW..].iter().copied())?;
        (recent_mean >= WARNING_THRESHOLD).then_some(Insight::Warning { recent_mean })
    }
}

pub struct ProtectiveTagRule;

impl InsightRule for ProtectiveTagRule {
    fn name(&self) -> &'static str {
        "tag_insight"
    }

    fn evaluate(&self, history: &[&Record]) -> Option<Insight> {
        let best = correlate(history.iter().copied())
            .into_iter()
            .filter(|stat| PROTECTIVE_TAGS.contains(&stat.tag.as_str()))
            .min_by(|a, b| {
                a.mean_score
                    .partial_cmp(&b.mean_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })?;

        if best.count < PROTECTIVE_TAG_MIN_COUNT {
            return None;
        }

        Some(Insight::TagInsight {
            tag: best.tag,
            count: best.count,
            mean_score: best.mean_score,
        })
    }
}

/// Rules in emission order.
pub fn default_rules() -> Vec<Box<dyn InsightRule>> {
    vec![
        Box::new(DayOfWeekRule),
        Box::new(RecentTrendRule),
        Box::new(SustainedHighRule),
        Box::new(ProtectiveTagRule),
    ]
}

pub fn infer(records: &[Record]) -> Vec<Insight> {
    infer_with(records, &default_rules())
}

pub fn infer_with(records: &[Record], rules: &[Box<dyn InsightRule>]) -> Vec<Insight> {
    if records.len() < MIN_RECORDS_FOR_INSIGHTS {
        return Vec::new();
    }

    let history = sort_chronological(records);
    rules
        .iter()
        .filter_map(|rule| {
            let insight = rule.evaluate(&history);
            if insight.is_some() {
                tracing::debug!(rule = rule.name(), "insight rule triggered");
            }
            insight
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::test_support::{day, record, tagged};

    fn history(records: &[Record]) -> Vec<&Record> {
        sort_chronological(records)
    }

    fn rising_fortnight() -> Vec<Record> {
        [2, 2, 2, 2, 2, 2, 2, 10, 10, 10, 10, 10, 10, 10]
            .iter()
            .enumerate()
            .map(|(i, score)| record(day(i as i64 + 1), *score))
            .collect()
    }

    #[test]
    fn nothing_below_minimum_sample() {
        let records: Vec<Record> = (0..6).map(|i| record(day(i), 20)).collect();
        assert!(infer(&records).is_empty());
        assert!(infer(&[]).is_empty());
    }

    #[test]
    fn no_day_pattern_from_six_spread_records() {
        let records: Vec<Record> = (0..6)
            .map(|i| record(day(i), if i % 2 == 0 { 1 } else { 9 }))
            .collect();
        assert!(DayOfWeekRule.evaluate(&history(&records)).is_some());
        assert!(infer(&records)
            .iter()
            .all(|insight| !matches!(insight, Insight::DayPattern { .. })));
    }

    #[test]
    fn rising_fortnight_emits_trend_in_fixed_order() {
        let insights = infer(&rising_fortnight());
        let trend = insights
            .iter()
            .find(|insight| matches!(insight, Insight::Trend { .. }))
            .expect("trend insight");
        assert_eq!(
            trend,
            &Insight::Trend {
                direction: TrendDirection::Rising,
                recent_mean: 10.0,
                previous_mean: 2.0,
            }
        );

        let kinds: Vec<usize> = insights
            .iter()
            .map(|insight| match insight {
                Insight::DayPattern { .. } => 0,
                Insight::Trend { .. } => 1,
                Insight::Warning { .. } => 2,
                Insight::TagInsight { .. } => 3,
            })
            .collect();
        let mut sorted = kinds.clone();
        sorted.sort();
        assert_eq!(kinds, sorted);
    }

    #[test]
    fn improving_trend_is_distinguished() {
        let records: Vec<Record> = (0..14)
            .map(|i| record(day(i), if i < 7 { 12 } else { 5 }))
            .collect();
        let insight = RecentTrendRule.evaluate(&history(&records));
        assert!(matches!(
            insight,
            Some(Insight::Trend {
                direction: TrendDirection::Improving,
                ..
            })
        ));
    }

    #[test]
    fn trend_needs_fourteen_records() {
        let records: Vec<Record> = (0..13)
            .map(|i| record(day(i), if i < 6 { 1 } else { 19 }))
            .collect();
        assert_eq!(RecentTrendRule.evaluate(&history(&records)), None);
    }

    #[test]
    fn day_pattern_requires_three_weekdays() {
        // 2026-01-01 is a Thursday; alternate Thursday / Friday only.
        let records: Vec<Record> = (0..8)
            .map(|i| {
                let offset = (i / 2) * 7 + (i % 2);
                record(day(offset), if i % 2 == 0 { 2 } else { 14 })
            })
            .collect();
        assert_eq!(DayOfWeekRule.evaluate(&history(&records)), None);
        assert!(infer(&records)
            .iter()
            .all(|insight| !matches!(insight, Insight::DayPattern { .. })));
    }

    #[test]
    fn day_pattern_names_worst_and_best_days() {
        let records = vec![
            record(day(0), 4),  // Thu
            record(day(1), 10), // Fri
            record(day(2), 3),  // Sat
            record(day(7), 4),  // Thu
            record(day(8), 12), // Fri
            record(day(9), 3),  // Sat
            record(day(10), 5), // Sun
        ];
        assert_eq!(
            DayOfWeekRule.evaluate(&history(&records)),
            Some(Insight::DayPattern {
                worst_day: Weekday::Fri,
                worst_mean: 11.0,
                best_day: Weekday::Sat,
                best_mean: 3.0,
            })
        );
    }

    #[test]
    fn flat_week_has_no_day_pattern() {
        let records: Vec<Record> = (0..7).map(|i| record(day(i), 6)).collect();
        assert_eq!(DayOfWeekRule.evaluate(&history(&records)), None);
    }

    #[test]
    fn warning_uses_exactly_last_five() {
        let mut records: Vec<Record> = (0..2).map(|i| record(day(i), 0)).collect();
        records.extend((2..7).map(|i| record(day(i), 15)));
        assert!(infer(&records).contains(&Insight::Warning { recent_mean: 15.0 }));

        records.push(record(day(7), 10));
        assert_eq!(SustainedHighRule.evaluate(&history(&records)), None);
    }

    #[test]
    fn warning_never_fires_with_four_records() {
        let records: Vec<Record> = (0..4).map(|i| record(day(i), 20)).collect();
        assert_eq!(SustainedHighRule.evaluate(&history(&records)), None);
        assert!(infer(&records).is_empty());
    }

    #[test]
    fn protective_tag_needs_three_occurrences() {
        let mut records = vec![
            tagged(day(0), 3, &["exercise"]),
            tagged(day(1), 4, &["exercise", "poor sleep"]),
            tagged(day(2), 2, &["meditation"]),
            tagged(day(3), 11, &["poor sleep"]),
        ];
        assert_eq!(ProtectiveTagRule.evaluate(&history(&records)), None);

        records.push(tagged(day(4), 5, &["exercise"]));
        records.push(tagged(day(5), 1, &["meditation"]));
        records.push(tagged(day(6), 3, &["meditation"]));
        assert_eq!(
            ProtectiveTagRule.evaluate(&history(&records)),
            Some(Insight::TagInsight {
                tag: "meditation".to_string(),
                count: 3,
                mean_score: 2.0,
            })
        );
    }

    #[test]
    fn trigger_tags_are_never_highlighted() {
        let records: Vec<Record> = (0..7).map(|i| tagged(day(i), 1, &["poor sleep"])).collect();
        assert_eq!(ProtectiveTagRule.evaluate(&history(&records)), None);
    }
}
