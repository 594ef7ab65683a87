//! CSV ingestion of interaction logs.
//!
//! The default layout is the Last.fm scrobble export:
//!
//! ```text
//! Username,Artist,Track,Album,Date,Time
//! alice,Daft Punk,One More Time,Discovery,31 Jan 2021,23:36
//! ```
//!
//! Rows with an empty actor, target or timestamp field are dropped; a
//! timestamp that is present but unparseable is an error. Returned events
//! are sorted chronologically (stable, so same-time rows keep file order).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::edge::Timestamp;
use crate::event::{sort_chronologically, Event};
use crate::{Error, Result};

/// Date/time layouts tried, in order, on `"<date> <time>"`.
const DATETIME_FORMATS: &[&str] = &[
    "%d %b %Y %H:%M",
    "%d %b %Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Where the timestamp lives in a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeColumns {
    /// Separate date and time-of-day columns, joined with a space.
    DateTime { date: String, time: String },
    /// One column holding a full date-time string.
    Combined { column: String },
    /// One column holding seconds as a number.
    Numeric { column: String },
}

/// Column names to read from the header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub actor: String,
    pub target: String,
    pub time: TimeColumns,
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self::lastfm()
    }
}

impl ColumnSpec {
    /// `Username`, `Track`, `Date` + `Time`.
    pub fn lastfm() -> Self {
        Self {
            actor: "Username".into(),
            target: "Track".into(),
            time: TimeColumns::DateTime {
                date: "Date".into(),
                time: "Time".into(),
            },
        }
    }

    /// Generic `actor,target,timestamp` with numeric seconds.
    pub fn numeric(
        actor: impl Into<String>,
        target: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            actor: actor.into(),
            target: target.into(),
            time: TimeColumns::Numeric {
                column: timestamp.into(),
            },
        }
    }
}

/// Resolved header positions.
enum TimeIdx {
    DateTime(usize, usize),
    Combined(usize),
    Numeric(usize),
}

fn column(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| Error::MissingColumn(name.to_owned()))
}

/// Parse a date-time string against the accepted layouts, as epoch seconds (UTC).
pub fn parse_datetime(text: &str) -> Option<Timestamp> {
    DATETIME_FORMATS.iter().find_map(|fmt| {
        NaiveDateTime::parse_from_str(text, fmt)
            .ok()
            .map(|dt| dt.and_utc().timestamp() as Timestamp)
    })
}

/// Read events from any CSV source with a header row.
pub fn read_events<R: Read>(reader: R, spec: &ColumnSpec) -> Result<Vec<Event>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let actor_idx = column(&headers, &spec.actor)?;
    let target_idx = column(&headers, &spec.target)?;
    let time_idx = match &spec.time {
        TimeColumns::DateTime { date, time } => {
            TimeIdx::DateTime(column(&headers, date)?, column(&headers, time)?)
        }
        TimeColumns::Combined { column: c } => TimeIdx::Combined(column(&headers, c)?),
        TimeColumns::Numeric { column: c } => TimeIdx::Numeric(column(&headers, c)?),
    };

    let mut events = Vec::new();
    let mut dropped = 0usize;

    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line() as usize);
        let field = |i: usize| record.get(i).map(str::trim).unwrap_or("");

        let actor = field(actor_idx);
        let target = field(target_idx);
        let raw_time = match time_idx {
            TimeIdx::DateTime(d, t) if !field(d).is_empty() && !field(t).is_empty() => {
                format!("{} {}", field(d), field(t))
            }
            TimeIdx::DateTime(..) => String::new(),
            TimeIdx::Combined(c) | TimeIdx::Numeric(c) => field(c).to_owned(),
        };

        if actor.is_empty() || target.is_empty() || raw_time.is_empty() {
            dropped += 1;
            continue;
        }

        let time = match time_idx {
            TimeIdx::Numeric(_) => raw_time.parse::<Timestamp>().ok().filter(|t| t.is_finite()),
            _ => parse_datetime(&raw_time),
        }
        .ok_or_else(|| Error::Timestamp {
            line,
            value: raw_time.clone(),
        })?;

        events.push(Event::new(actor, target, time));
    }

    if dropped > 0 {
        tracing::warn!(dropped, kept = events.len(), "dropped rows with missing fields");
    }

    sort_chronologically(&mut events);
    Ok(events)
}

/// Read events from a CSV file.
pub fn read_events_path(path: impl AsRef<Path>, spec: &ColumnSpec) -> Result<Vec<Event>> {
    let file = File::open(path.as_ref())?;
    read_events(file, spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LASTFM: &str = "\
Username,Artist,Track,Album,Date,Time
bob,Air,La Femme d'Argent,Moon Safari,01 Feb 2021,10:00
alice,Daft Punk,One More Time,Discovery,31 Jan 2021,23:36
carol,Air,Sexy Boy,Moon Safari,,12:00
";

    #[test]
    fn test_parse_datetime_layouts() {
        assert_eq!(parse_datetime("01 Jan 1970 00:01"), Some(60.0));
        assert_eq!(parse_datetime("1970-01-02 00:00:00"), Some(86_400.0));
        assert_eq!(parse_datetime("yesterday"), None);
    }

    #[test]
    fn test_read_lastfm_sorted_and_dropna() {
        let events = read_events(LASTFM.as_bytes(), &ColumnSpec::lastfm()).unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].actor, "alice");
        assert_eq!(events[0].target, "One More Time");
        assert_eq!(events[1].actor, "bob");
        assert!(events[0].time < events[1].time);
    }

    #[test]
    fn test_bad_timestamp_reports_line() {
        let csv = "Username,Track,Date,Time\nalice,x,31 Jan 2021,23:36\nbob,y,someday,noon\n";
        let err = read_events(csv.as_bytes(), &ColumnSpec::lastfm()).unwrap_err();

        match err {
            Error::Timestamp { line, value } => {
                assert_eq!(line, 3);
                assert_eq!(value, "someday noon");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_column() {
        let csv = "user,item,ts\na,b,1\n";
        let err = read_events(csv.as_bytes(), &ColumnSpec::lastfm()).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(c) if c == "Username"));
    }

    #[test]
    fn test_numeric_timestamps() {
        let csv = "user,item,ts\na,b,30\nb,c,10.5\n";
        let spec = ColumnSpec::numeric("user", "item", "ts");
        let events = read_events(csv.as_bytes(), &spec).unwrap();

        assert_eq!(events[0], Event::new("b", "c", 10.5));
        assert_eq!(events[1], Event::new("a", "b", 30.0));
    }

    #[test]
    fn test_read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        std::fs::write(&path, LASTFM).unwrap();

        let events = read_events_path(&path, &ColumnSpec::default()).unwrap();
        assert_eq!(events.len(), 2);
    }
}
