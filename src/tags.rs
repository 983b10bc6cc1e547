use std::collections::BTreeMap;

use crate::models::{Record, TagStat};

/// Mean score per tag, worst (highest mean) first.
///
/// A record with several tags contributes its full score to each of them.
/// Equal means keep the tag's lexical order.
pub fn correlate<'a, I>(records: I) -> Vec<TagStat>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut totals: BTreeMap<&str, (u64, usize)> = BTreeMap::new();

    for record in records {
        for tag in &record.tags {
            let entry = totals.entry(tag.as_str()).or_insert((0, 0));
            entry.0 += u64::from(record.score);
            entry.1 += 1;
        }
    }

    let mut stats: Vec<TagStat> = totals
        .into_iter()
        .map(|(tag, (total, count))| TagStat {
            tag: tag.to_string(),
            mean_score: total as f64 / count as f64,
            count,
        })
        .collect();

    stats.sort_by(|a, b| {
        b.mean_score
            .partial_cmp(&a.mean_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RecordDraft, ScoreScale};
    use crate::window::test_support::{day, record, tagged};

    #[test]
    fn multi_tag_record_counts_fully_for_each_tag() {
        let records = vec![tagged(day(1), 8, &["A", "B"]), tagged(day(2), 4, &["A"])];
        let stats = correlate(&records);
        assert_eq!(
            stats,
            vec![
                TagStat {
                    tag: "B".to_string(),
                    mean_score: 8.0,
                    count: 1
                },
                TagStat {
                    tag: "A".to_string(),
                    mean_score: 6.0,
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn no_tags_means_no_stats() {
        assert!(correlate(Vec::<&Record>::new()).is_empty());
        let untagged = vec![record(day(1), 3), record(day(2), 9)];
        assert!(correlate(&untagged).is_empty());
    }

    #[test]
    fn counts_sum_to_total_tag_occurrences() {
        let records = vec![
            tagged(day(1), 8, &["poor sleep", "work stress", "bad weather"]),
            tagged(day(2), 4, &["exercise"]),
            record(day(3), 10),
            tagged(day(4), 6, &["work stress", "exercise"]),
        ];
        let expected: usize = records.iter().map(|r| r.tags.len()).sum();
        let total: usize = correlate(&records).iter().map(|s| s.count).sum();
        assert_eq!(total, expected);
    }

    #[test]
    fn count_sum_holds_for_validated_records_with_repeats() {
        let record = RecordDraft {
            owner: "avery@example.com".to_string(),
            date: "2026-01-05".to_string(),
            score: 6,
            tags: vec!["exercise".to_string(), "exercise".to_string()],
            ..RecordDraft::default()
        }
        .validate(ScoreScale::Severity)
        .unwrap();
        let records = vec![record, tagged(day(2), 4, &["exercise", "good sleep"])];

        let expected: usize = records.iter().map(|r| r.tags.len()).sum();
        let stats = correlate(&records);
        let total: usize = stats.iter().map(|s| s.count).sum();
        assert_eq!(total, expected);
        assert_eq!(stats.iter().find(|s| s.tag == "exercise").unwrap().count, 2);
    }

    #[test]
    fn ties_follow_tag_order() {
        let records = vec![
            tagged(day(1), 5, &["zeta"]),
            tagged(day(2), 5, &["alpha"]),
            tagged(day(3), 5, &["mid"]),
        ];
        let order: Vec<String> = correlate(&records).into_iter().map(|s| s.tag).collect();
        assert_eq!(order, vec!["alpha", "mid", "zeta"]);
    }
}
