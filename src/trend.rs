use chrono::NaiveDate;

use crate::models::{Record, WeeklyComparison};
use crate::window::{mean_score, weekly_windows};

pub fn compare(records: &[Record], today: NaiveDate) -> WeeklyComparison {
    let windows = weekly_windows(records, today);
    WeeklyComparison {
        current_avg: mean_score(windows.current.iter().copied()),
        prior_avg: mean_score(windows.prior.iter().copied()),
    }
}

/// Supportive nudge shown after a check-in when this week is worse than
/// last week. Silent whenever either week lacks data.
pub fn weekly_alert(comparison: &WeeklyComparison) -> Option<String> {
    let (current, prior) = (comparison.current_avg?, comparison.prior_avg?);
    if !comparison.is_worsening() {
        return None;
    }
    Some(format!(
        "Alert: your average score this week ({current:.1}) is higher than last week ({prior:.1}). \
         Please consider reaching out to someone or taking a break."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::test_support::{day, record};

    #[test]
    fn empty_windows_leave_everything_undefined() {
        let comparison = compare(&[], day(14));
        assert_eq!(comparison.current_avg, None);
        assert_eq!(comparison.prior_avg, None);
        assert_eq!(comparison.delta(), None);
        assert_eq!(weekly_alert(&comparison), None);

        let stale = vec![record(day(0), 12)];
        let comparison = compare(&stale, day(40));
        assert_eq!(comparison.delta(), None);
    }

    #[test]
    fn two_week_rise_reports_signed_delta() {
        let scores = [2, 2, 2, 2, 2, 2, 2, 10, 10, 10, 10, 10, 10, 10];
        let records: Vec<Record> = scores
            .iter()
            .enumerate()
            .map(|(i, score)| record(day(i as i64 + 1), *score))
            .collect();

        let comparison = compare(&records, day(14));
        assert_eq!(comparison.current_avg, Some(10.0));
        assert_eq!(comparison.prior_avg, Some(2.0));
        assert_eq!(comparison.delta(), Some(8.0));
        assert!(comparison.is_worsening());
        assert!(weekly_alert(&comparison).is_some());
    }

    #[test]
    fn improvement_keeps_negative_sign_and_no_alert() {
        let records = vec![record(day(3), 12), record(day(10), 4)];
        let comparison = compare(&records, day(10));
        assert_eq!(comparison.delta(), Some(-8.0));
        assert_eq!(weekly_alert(&comparison), None);
    }

    #[test]
    fn missing_prior_week_is_not_treated_as_zero() {
        let records = vec![record(day(10), 6)];
        let comparison = compare(&records, day(10));
        assert_eq!(comparison.current_avg, Some(6.0));
        assert_eq!(comparison.prior_avg, None);
        assert_eq!(comparison.delta(), None);
    }
}
