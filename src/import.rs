use std::io::Read;

use serde::Deserialize;

use crate::record::{clamp_all, Gender, ResponseRecord};
use crate::scoring::Likert;
use crate::Error;

/// Paper-form answers as typed into a spreadsheet: no scores, SMEQ not yet clamped.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAnswerRow {
    pub gender: Gender,
    pub smeq_1: i64,
    pub smeq_2: i64,
    pub smeq_3: i64,
    pub smeq_4: i64,
    pub smeq_5: i64,
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
}

impl From<RawAnswerRow> for ResponseRecord {
    fn from(row: RawAnswerRow) -> Self {
        ResponseRecord::new(
            row.gender,
            clamp_all([row.smeq_1, row.smeq_2, row.smeq_3, row.smeq_4, row.smeq_5]),
            [
                row.se_1, row.se_2, row.se_3, row.se_4, row.se_5, row.se_6, row.se_7, row.se_8,
                row.se_9, row.se_10,
            ],
        )
    }
}

/// Read raw answer rows from CSV with a header line.
///
/// Yields the 1-based data row number with each record; a bad row is reported
/// and reading continues with the next one. Extra columns such as stored scores
/// are ignored.
pub fn read_bulk<R: Read>(
    reader: R,
) -> impl Iterator<Item = Result<(usize, ResponseRecord), Error>> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
        .into_deserialize::<RawAnswerRow>()
        .enumerate()
        .map(|(offset, row)| {
            row.map(|row| (offset + 1, ResponseRecord::from(row)))
                .map_err(Error::from)
        })
}
