use crate::error::{MoodError, MoodResult};
use crate::models::ScoreScale;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub scale: ScoreScale,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> MoodResult<Self> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Reads configuration through `get` so tests never touch the process
    /// environment.
    pub fn from_env_with<F>(mut get: F) -> MoodResult<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let database_url = get("DATABASE_URL").ok_or_else(|| {
            MoodError::Config("DATABASE_URL must be set to a Postgres instance".into())
        })?;
        let scale = match get("MOOD_TRACKER_SCALE") {
            Some(value) => ScoreScale::parse(&value)?,
            None => ScoreScale::default(),
        };
        let max_connections = match get("MOOD_TRACKER_MAX_CONNECTIONS") {
            Some(value) => value.trim().parse().map_err(|_| {
                MoodError::Config(format!("MOOD_TRACKER_MAX_CONNECTIONS '{value}' is not a number"))
            })?,
            None => 5,
        };
        Ok(Self {
            database_url,
            scale,
            max_connections,
        })
    }
}
