use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::scoring::{
    clamp_smeq, item_score, score_smeq, Likert, SELF_ESTEEM_ITEMS, SMEQ_ITEMS,
    SMEQ_MAX,
};
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gender::ALL
            .into_iter()
            .find(|gender| gender.label() == s)
            .ok_or_else(|| Error::InvalidScoreInput(format!("unknown gender {s:?}")))
    }
}

/// One questionnaire submission.
///
/// Only the raw answers are held; both scores are recomputed on access so they
/// can never drift from the answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseRecord {
    gender: Gender,
    smeq: [u8; SMEQ_ITEMS],
    self_esteem: [Likert; SELF_ESTEEM_ITEMS],
}

impl ResponseRecord {
    /// SMEQ values above the scale maximum are clamped.
    pub fn new(
        gender: Gender,
        smeq: [u8; SMEQ_ITEMS],
        self_esteem: [Likert; SELF_ESTEEM_ITEMS],
    ) -> Self {
        Self {
            gender,
            smeq: smeq.map(|value| value.min(SMEQ_MAX)),
            self_esteem,
        }
    }

    /// Build a record from the answer maps produced by the form, keyed 1-based.
    pub fn from_answers(
        gender: Gender,
        smeq: &BTreeMap<u8, u8>,
        self_esteem: &BTreeMap<u8, Likert>,
    ) -> Result<Self, Error> {
        let mut smeq_values = [0; SMEQ_ITEMS];
        for (offset, value) in smeq_values.iter_mut().enumerate() {
            let index = offset as u8 + 1;
            *value = *smeq.get(&index).ok_or_else(|| {
                Error::InvalidScoreInput(format!("SMEQ item {index} is unanswered"))
            })?;
        }

        let mut answers = [Likert::StronglyDisagree; SELF_ESTEEM_ITEMS];
        for (offset, answer) in answers.iter_mut().enumerate() {
            let index = offset as u8 + 1;
            *answer = *self_esteem.get(&index).ok_or_else(|| {
                Error::InvalidScoreInput(format!("self-esteem item {index} is unanswered"))
            })?;
        }

        Ok(Self::new(gender, smeq_values, answers))
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn smeq(&self) -> &[u8; SMEQ_ITEMS] {
        &self.smeq
    }

    pub fn self_esteem(&self) -> &[Likert; SELF_ESTEEM_ITEMS] {
        &self.self_esteem
    }

    pub fn smeq_answers(&self) -> BTreeMap<u8, u8> {
        (1..).zip(self.smeq).collect()
    }

    pub fn self_esteem_answers(&self) -> BTreeMap<u8, Likert> {
        (1..).zip(self.self_esteem).collect()
    }

    pub fn smeq_score(&self) -> u32 {
        score_smeq(&self.smeq_answers())
    }

    pub fn self_esteem_score(&self) -> u32 {
        (1..)
            .zip(self.self_esteem)
            .map(|(index, answer)| u32::from(item_score(index, answer)))
            .sum()
    }
}

/// Flat tabular form of a record, shared by the persisted blob and the CSV export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRow {
    pub gender: Gender,
    pub smeq_1: u8,
    pub smeq_2: u8,
    pub smeq_3: u8,
    pub smeq_4: u8,
    pub smeq_5: u8,
    pub se_1: Likert,
    pub se_2: Likert,
    pub se_3: Likert,
    pub se_4: Likert,
    pub se_5: Likert,
    pub se_6: Likert,
    pub se_7: Likert,
    pub se_8: Likert,
    pub se_9: Likert,
    pub se_10: Likert,
    #[serde(rename = "SMEQ_Score")]
    pub smeq_score: u32,
    #[serde(rename = "Self_Esteem_Score")]
    pub self_esteem_score: u32,
}

impl From<&ResponseRecord> for ResponseRow {
    fn from(record: &ResponseRecord) -> Self {
        let [smeq_1, smeq_2, smeq_3, smeq_4, smeq_5] = record.smeq;
        let [se_1, se_2, se_3, se_4, se_5, se_6, se_7, se_8, se_9, se_10] = record.self_esteem;
        ResponseRow {
            gender: record.gender,
            smeq_1,
            smeq_2,
            smeq_3,
            smeq_4,
            smeq_5,
            se_1,
            se_2,
            se_3,
            se_4,
            se_5,
            se_6,
            se_7,
            se_8,
            se_9,
            se_10,
            smeq_score: record.smeq_score(),
            self_esteem_score: record.self_esteem_score(),
        }
    }
}

/// Rebuild a record from a stored row.
///
/// Rows with SMEQ answers above the scale or with scores that disagree with
/// their answers are rejected rather than repaired.
impl TryFrom<ResponseRow> for ResponseRecord {
    type Error = Error;

    fn try_from(row: ResponseRow) -> Result<Self, Self::Error> {
        let smeq = [row.smeq_1, row.smeq_2, row.smeq_3, row.smeq_4, row.smeq_5];
        if let Some(value) = smeq.iter().find(|&&value| value > SMEQ_MAX) {
            return Err(Error::MalformedPersistedData(format!(
                "SMEQ answer {value} exceeds {SMEQ_MAX}"
            )));
        }
        let record = ResponseRecord {
            gender: row.gender,
            smeq,
            self_esteem: [
                row.se_1, row.se_2, row.se_3, row.se_4, row.se_5, row.se_6, row.se_7, row.se_8,
                row.se_9, row.se_10,
            ],
        };
        if record.smeq_score() != row.smeq_score {
            return Err(Error::MalformedPersistedData(format!(
                "stored SMEQ score {} does not match answers ({})",
                row.smeq_score,
                record.smeq_score()
            )));
        }
        if record.self_esteem_score() != row.self_esteem_score {
            return Err(Error::MalformedPersistedData(format!(
                "stored self-esteem score {} does not match answers ({})",
                row.self_esteem_score,
                record.self_esteem_score()
            )));
        }
        Ok(record)
    }
}

/// Clamp helper for raw integers coming from a form or a bulk file.
pub(crate) fn clamp_all(values: [i64; SMEQ_ITEMS]) -> [u8; SMEQ_ITEMS] {
    values.map(clamp_smeq)
}
