use anyhow::Context;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use sqlx::{PgPool, Row};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    parse_medication, parse_tags, Record, RecordDraft, ScoreScale, GRATITUDE_SEPARATOR,
};

/// Append-only home for check-ins. Ordering of `list_records` is not
/// guaranteed; callers sort.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_records(&self, owner: &str) -> anyhow::Result<Vec<Record>>;
    async fn append_record(&self, record: &Record) -> anyhow::Result<()>;
}

pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Stored rows must still sit on a known scale; the widest one bounds them.
fn stored_score(score: i32) -> anyhow::Result<u8> {
    ScoreScale::Severity
        .check(i64::from(score))
        .with_context(|| format!("stored score {score} is out of range"))
}

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn list_records(&self, owner: &str) -> anyhow::Result<Vec<Record>> {
        let rows = sqlx::query(
            "SELECT owner, entry_date, score, tags, note, gratitude, medication_taken \
             FROM mood_tracker.records \
             WHERE owner = $1 \
             ORDER BY seq",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let score: i32 = row.get("score");
            let tags: String = row.get("tags");
            records.push(Record {
                owner: row.get("owner"),
                date: row.get("entry_date"),
                score: stored_score(score)?,
                tags: parse_tags(&tags),
                note: row.get("note"),
                gratitude: row.get("gratitude"),
                medication_taken: row.get("medication_taken"),
            });
        }

        tracing::debug!(owner, count = records.len(), "listed records");
        Ok(records)
    }

    async fn append_record(&self, record: &Record) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO mood_tracker.records
            (id, owner, entry_date, score, tags, note, gratitude, medication_taken)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&record.owner)
        .bind(record.date)
        .bind(i32::from(record.score))
        .bind(record.joined_tags())
        .bind(&record.note)
        .bind(&record.gratitude)
        .bind(record.medication_taken)
        .execute(&self.pool)
        .await
        .context("failed to append record")?;

        tracing::info!(owner = %record.owner, date = %record.date, "record appended");
        Ok(())
    }
}

/// Process-local store used by tests and dry runs.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<Record>>,
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list_records(&self, owner: &str) -> anyhow::Result<Vec<Record>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|record| record.owner == owner)
            .cloned()
            .collect())
    }

    async fn append_record(&self, record: &Record) -> anyhow::Result<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }
}

/// Loads two weeks of check-ins ending at `today`. Skips owners that
/// already have history.
pub async fn seed(
    store: &dyn RecordStore,
    owner: &str,
    today: NaiveDate,
) -> anyhow::Result<usize> {
    if !store.list_records(owner).await?.is_empty() {
        tracing::info!(owner, "owner already has records, skipping seed");
        return Ok(0);
    }

    let entries: [(i64, i64, &[&str], Option<bool>, &str); 14] = [
        (13, 6, &["exercise"], Some(true), "Morning run"),
        (12, 7, &["work stress"], Some(true), ""),
        (11, 5, &["good sleep", "exercise"], Some(true), ""),
        (10, 9, &["poor sleep"], Some(false), "Up until 3am"),
        (9, 8, &["work stress", "poor sleep"], Some(true), ""),
        (8, 4, &["time outdoors", "exercise"], Some(true), "Hike with Sam"),
        (7, 5, &["social connection"], Some(true), ""),
        (6, 10, &["interpersonal conflict"], Some(false), ""),
        (5, 11, &["work stress", "unexplained anxiety"], Some(false), ""),
        (4, 9, &["bad weather"], Some(true), ""),
        (3, 12, &["poor sleep", "apathy/emptiness"], Some(false), "Hard to get up"),
        (2, 8, &["exercise"], Some(true), ""),
        (1, 10, &["work stress"], Some(true), ""),
        (0, 9, &[], Some(true), "Quiet day"),
    ];

    let mut inserted = 0usize;
    for (days_ago, score, tags, medication_taken, note) in entries {
        let record = RecordDraft {
            owner: owner.to_string(),
            date: (today - Duration::days(days_ago)).to_string(),
            score,
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            note: Some(note.to_string()),
            gratitude: if days_ago % 3 == 0 {
                vec!["coffee".to_string(), "a kind message".to_string()]
            } else {
                Vec::new()
            },
            medication_taken,
        }
        .validate(ScoreScale::Severity)?;
        store.append_record(&record).await?;
        inserted += 1;
    }

    Ok(inserted)
}

#[derive(serde::Deserialize)]
struct CsvRow {
    owner: String,
    date: String,
    score: i64,
    #[serde(default)]
    tags: String,
    #[serde(default)]
    note: String,
    #[serde(default)]
    gratitude: String,
    #[serde(default)]
    medication_taken: String,
}

/// Validates every row first; a single bad row aborts the import before
/// anything is written.
pub async fn import_csv(
    store: &dyn RecordStore,
    csv_path: &std::path::Path,
    scale: ScoreScale,
) -> anyhow::Result<usize> {
    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut records = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let line = index + 2;
        let row = result.with_context(|| format!("row {line}: unreadable"))?;
        let draft = RecordDraft {
            owner: row.owner,
            date: row.date,
            score: row.score,
            tags: parse_tags(&row.tags),
            note: Some(row.note),
            gratitude: row
                .gratitude
                .split(GRATITUDE_SEPARATOR.trim())
                .map(str::to_string)
                .collect(),
            medication_taken: parse_medication(&row.medication_taken)
                .with_context(|| format!("row {line}"))?,
        };
        records.push(draft.validate(scale).with_context(|| format!("row {line}"))?);
    }

    for record in &records {
        store.append_record(record).await?;
    }

    tracing::info!(path = %csv_path.display(), count = records.len(), "csv import finished");
    Ok(records.len())
}
