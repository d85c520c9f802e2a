use once_cell::sync::Lazy;
use serde::Deserialize;

pub mod export;
pub mod import;
pub mod logging;
pub mod record;
pub mod scoring;
pub mod store;

pub use export::{to_csv, write_csv, CSV_HEADER, EXPORT_FILE_NAME, EXPORT_MIME_TYPE};
pub use import::{read_bulk, RawAnswerRow};
pub use record::{Gender, ResponseRecord, ResponseRow};
pub use scoring::{
    clamp_smeq, is_reverse_scored, item_score, score_self_esteem, score_smeq, Likert,
    REVERSE_SCORED_ITEMS, SELF_ESTEEM_ITEMS, SMEQ_ITEMS, SMEQ_MAX,
};
pub use store::{
    load, Aggregate, FileStorage, KeyValueStore, Loaded, MemoryStorage, ResponseStore,
    STORAGE_KEY,
};

pub static QUESTIONNAIRE: Lazy<Questionnaire> = Lazy::new(|| {
    serde_json::from_str(include_str!("../resources/questionnaire.json"))
        .expect("embedded questionnaire master is valid")
});

#[derive(Debug, Clone, Deserialize)]
pub struct Question {
    pub id: u8,
    pub text: String,
    #[serde(default)]
    pub reverse: bool,
}

/// SMEQ block: how often social media is checked at five fixed moments of the day.
#[derive(Debug, Deserialize)]
pub struct SmeqSection {
    pub title: String,
    pub instruction: String,
    pub min: u8,
    pub max: u8,
    /// Pre-filled value offered when the participant just presses enter.
    pub default: u8,
    pub questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
pub struct SelfEsteemSection {
    pub title: String,
    pub instruction: String,
    /// Display order of the answer options.
    pub options: Vec<Likert>,
    pub questions: Vec<Question>,
}

/// Question master of the study.
#[derive(Debug, Deserialize)]
pub struct Questionnaire {
    pub genders: Vec<Gender>,
    pub smeq: SmeqSection,
    pub self_esteem: SelfEsteemSection,
}

impl Questionnaire {
    /// Look up a self-esteem statement by its item number.
    pub fn self_esteem_question(&self, id: u8) -> Option<&Question> {
        self.self_esteem.questions.iter().find(|q| q.id == id)
    }

    /// Look up a SMEQ moment by its item number.
    pub fn smeq_question(&self, id: u8) -> Option<&Question> {
        self.smeq.questions.iter().find(|q| q.id == id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The stored blob could not be turned back into records.
    #[error("malformed persisted data: {0}")]
    MalformedPersistedData(String),
    /// Missing item or unknown answer label.
    #[error("invalid score input: {0}")]
    InvalidScoreInput(String),
    #[error("index {index} is out of range for {len} responses")]
    IndexOutOfRange { index: usize, len: usize },
    /// Writing to the backing store failed; the in-memory change was undone.
    #[error("failed to persist responses: {0}")]
    PersistWrite(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
