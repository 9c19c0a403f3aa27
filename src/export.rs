use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::error::StoreError;
use crate::models::{Club, Dataset, Event, Membership, Student};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("unsupported export format: {other}")),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument<'a> {
    students: &'a [Student],
    clubs: &'a [Club],
    memberships: &'a [Membership],
    events: &'a [Event],
    export_date: DateTime<Utc>,
}

pub fn export_json(data: &Dataset, exported_at: DateTime<Utc>) -> Result<String, StoreError> {
    let document = ExportDocument {
        students: &data.students,
        clubs: &data.clubs,
        memberships: &data.memberships,
        events: &data.events,
        export_date: exported_at,
    };
    serde_json::to_string_pretty(&document).map_err(|err| StoreError::Export(err.to_string()))
}

pub fn export_students_csv(students: &[Student]) -> Result<String, StoreError> {
    if students.is_empty() {
        return Ok(String::new());
    }

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::NonNumeric)
        .from_writer(Vec::new());
    for student in students {
        writer
            .serialize(student)
            .map_err(|err| StoreError::Export(err.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| StoreError::Export(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| StoreError::Export(err.to_string()))
}

pub fn export_file_name(format: ExportFormat, date: NaiveDate) -> String {
    let day = date.format("%Y-%m-%d");
    match format {
        ExportFormat::Json => format!("campus-nexus-data-{day}.json"),
        ExportFormat::Csv => format!("students-{day}.csv"),
    }
}

pub fn export(
    data: &Dataset,
    format: ExportFormat,
    exported_at: DateTime<Utc>,
) -> Result<String, StoreError> {
    match format {
        ExportFormat::Json => export_json(data, exported_at),
        ExportFormat::Csv => export_students_csv(&data.students),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::fixtures::*;

    #[test]
    fn csv_quotes_text_and_leaves_numbers_bare() {
        let mut s = student("s1", 72.5);
        s.name = "Casey \"CJ\" Jones".to_string();
        let csv = export_students_csv(&[s]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some(r#""id","name","email","major","year","engagement""#)
        );
        assert_eq!(
            lines.next(),
            Some(r#""s1","Casey ""CJ"" Jones","s1@university.edu","Biology","Junior",72.5"#)
        );
    }

    #[test]
    fn empty_student_list_exports_nothing() {
        assert_eq!(export_students_csv(&[]).unwrap(), "");
    }

    #[test]
    fn json_export_carries_collections_and_date() {
        let data = two_clubs();
        let now = chrono::Utc::now();
        let raw = export(&data, ExportFormat::Json, now).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["students"].as_array().unwrap().len(), 5);
        assert_eq!(value["memberships"][0]["studentId"], "s1");
        assert!(value.get("exportDate").is_some());
        assert!(value.get("users").is_none());
    }

    #[test]
    fn file_names_follow_format() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(export_file_name(ExportFormat::Json, day), "campus-nexus-data-2026-03-01.json");
        assert_eq!(export_file_name(ExportFormat::Csv, day), "students-2026-03-01.csv");
    }
}
