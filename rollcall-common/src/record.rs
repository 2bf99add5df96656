//! Attendance ledger row model
//!
//! One `AttendanceRecord` is one row of the ledger file. The CSV header is
//! `Name,Date,Time,Status,Remark`; serde renames keep the on-disk vocabulary
//! exactly as external consumers of the report expect it.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Attendance status for a ledger row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Present,
    Absent,
}

/// Punctuality remark for a ledger row
///
/// `Remark::None` is the `"-"` placeholder carried by absentee rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Remark {
    #[serde(rename = "ON-TIME")]
    OnTime,
    #[serde(rename = "LATE")]
    Late,
    #[serde(rename = "-")]
    None,
}

impl std::fmt::Display for Remark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Remark::OnTime => write!(f, "ON-TIME"),
            Remark::Late => write!(f, "LATE"),
            Remark::None => write!(f, "-"),
        }
    }
}

/// One ledger row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttendanceRecord {
    pub name: String,
    pub date: NaiveDate,
    /// Scan time for Present rows, `"-"` for Absent rows
    #[serde(with = "dash_time")]
    pub time: Option<NaiveTime>,
    pub status: Status,
    pub remark: Remark,
}

impl AttendanceRecord {
    /// Build a Present row for a scan accepted at `time`
    pub fn present(name: impl Into<String>, date: NaiveDate, time: NaiveTime, remark: Remark) -> Self {
        Self {
            name: name.into(),
            date,
            time: Some(time),
            status: Status::Present,
            remark,
        }
    }

    /// Build an Absent row appended at finalization
    pub fn absent(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            date,
            time: None,
            status: Status::Absent,
            remark: Remark::None,
        }
    }
}

/// Serde codec for the Time column: `HH:MM:SS` or the `"-"` placeholder
mod dash_time {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M:%S";

    pub fn serialize<S>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(t) => serializer.serialize_str(&t.format(FORMAT).to_string()),
            None => serializer.serialize_str("-"),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s == "-" {
            return Ok(None);
        }
        NaiveTime::parse_from_str(&s, FORMAT)
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[test]
    fn test_present_row_csv_shape() {
        let record = AttendanceRecord::present(
            "ALICE",
            date(),
            NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            Remark::OnTime,
        );

        let mut writer = csv::Writer::from_writer(vec![]);
        writer.serialize(&record).unwrap();
        let csv = String::from_utf8(writer.into_inner().unwrap()).unwrap();

        assert_eq!(
            csv,
            "Name,Date,Time,Status,Remark\nALICE,2025-03-14,08:30:00,Present,ON-TIME\n"
        );
    }

    #[test]
    fn test_absent_row_csv_shape() {
        let record = AttendanceRecord::absent("BOB", date());

        let mut writer = csv::Writer::from_writer(vec![]);
        writer.serialize(&record).unwrap();
        let csv = String::from_utf8(writer.into_inner().unwrap()).unwrap();

        assert_eq!(csv, "Name,Date,Time,Status,Remark\nBOB,2025-03-14,-,Absent,-\n");
    }

    #[test]
    fn test_rows_round_trip() {
        let rows = vec![
            AttendanceRecord::present(
                "ALICE",
                date(),
                NaiveTime::from_hms_opt(9, 10, 0).unwrap(),
                Remark::Late,
            ),
            AttendanceRecord::absent("BOB", date()),
        ];

        let mut writer = csv::Writer::from_writer(vec![]);
        for row in &rows {
            writer.serialize(row).unwrap();
        }
        let bytes = writer.into_inner().unwrap();

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let parsed: Vec<AttendanceRecord> = reader
            .deserialize()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(parsed, rows);
    }
}
