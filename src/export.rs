use std::io::Write;

use crate::record::{ResponseRecord, ResponseRow};
use crate::Error;

pub const EXPORT_FILE_NAME: &str = "persistent_study_responses.csv";
pub const EXPORT_MIME_TYPE: &str = "text/csv";

/// Column order of the export; matches the field order of [`ResponseRow`].
pub const CSV_HEADER: [&str; 18] = [
    "gender",
    "smeq_1",
    "smeq_2",
    "smeq_3",
    "smeq_4",
    "smeq_5",
    "se_1",
    "se_2",
    "se_3",
    "se_4",
    "se_5",
    "se_6",
    "se_7",
    "se_8",
    "se_9",
    "se_10",
    "SMEQ_Score",
    "Self_Esteem_Score",
];

/// Write every record as CSV. The header row is written even for an empty table.
pub fn write_csv<W: Write>(records: &[ResponseRecord], writer: W) -> Result<(), Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.serialize(ResponseRow::from(record))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn to_csv(records: &[ResponseRecord]) -> Result<Vec<u8>, Error> {
    let mut buffer = Vec::new();
    write_csv(records, &mut buffer)?;
    Ok(buffer)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::record::Gender;
    use crate::scoring::Likert;

    #[test]
    fn test_empty_is_header_only() {
        let csv = String::from_utf8(to_csv(&[]).unwrap()).unwrap();
        assert_eq!(csv, format!("{}\n", CSV_HEADER.join(",")));
    }

    #[test]
    fn test_header_matches_row_fields() {
        let record = ResponseRecord::new(Gender::Male, [0; 5], [Likert::Agree; 10]);
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.serialize(ResponseRow::from(&record)).unwrap();
        let bytes = writer.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().next(), Some(CSV_HEADER.join(",").as_str()));
    }

    #[test]
    fn test_rows() {
        let records = vec![
            ResponseRecord::new(Gender::Male, [0, 1, 2, 1, 0], [Likert::Agree; 10]),
            ResponseRecord::new(Gender::Female, [7; 5], [Likert::StronglyDisagree; 10]),
        ];
        let csv = String::from_utf8(to_csv(&records).unwrap()).unwrap();
        let lines = csv.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "Male,0,1,2,1,0,Agree,Agree,Agree,Agree,Agree,Agree,Agree,Agree,Agree,Agree,4,25"
        );
        assert!(lines[2].starts_with("Female,7,7,7,7,7,Strongly Disagree,"));
        assert!(lines[2].ends_with(",35,25"));
    }
}
