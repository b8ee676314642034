use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;

use crate::ontology::Category;
use crate::record::FoaRecord;

pub const JSON_FILE: &str = "foa.json";
pub const CSV_FILE: &str = "foa.csv";

const TAG_DELIMITER: &str = "; ";
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub const CSV_HEADER: [&str; 13] = [
    "foa_id",
    "title",
    "agency",
    "open_date",
    "close_date",
    "eligibility_text",
    "program_description",
    "award_range",
    "source_url",
    "research_domains",
    "methods",
    "populations",
    "sponsor_themes",
];

/// A single record renders as an object, several as an array.
pub fn to_json(records: &[FoaRecord]) -> serde_json::Result<String> {
    match records {
        [one] => serde_json::to_string_pretty(one),
        many => serde_json::to_string_pretty(many),
    }
}

pub fn csv_row(record: &FoaRecord) -> Vec<String> {
    let mut row = vec![
        record.foa_id.clone(),
        record.title.clone(),
        record.agency.clone(),
        format_date(record.open_date),
        format_date(record.close_date),
        record.eligibility_text.clone(),
        record.program_description.clone(),
        record.award_range.clone(),
        record.source_url.clone(),
    ];
    for category in Category::ALL {
        row.push(record.semantic_tags.get(category).join(TAG_DELIMITER));
    }
    row
}

pub fn write_csv<W: Write>(mut w: W, records: &[FoaRecord]) -> io::Result<()> {
    let header: Vec<String> = CSV_HEADER.iter().map(|h| h.to_string()).collect();
    write_row(&mut w, &header)?;
    for record in records {
        write_row(&mut w, &csv_row(record))?;
    }
    Ok(())
}

fn write_row<W: Write>(w: &mut W, row: &[String]) -> io::Result<()> {
    let cells: Vec<String> = row.iter().map(|c| quote(c)).collect();
    write!(w, "{}\r\n", cells.join(","))
}

fn quote(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

fn format_date(date: Option<NaiveDateTime>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string()).unwrap_or_default()
}

/// Render both outputs, then write them. Nothing touches disk if rendering fails.
pub fn write_outputs(out_dir: &Path, records: &[FoaRecord]) -> Result<(PathBuf, PathBuf)> {
    let json = to_json(records).context("Failed to render JSON")?;
    let mut csv = Vec::new();
    write_csv(&mut csv, records).context("Failed to render CSV")?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let json_path = out_dir.join(JSON_FILE);
    let csv_path = out_dir.join(CSV_FILE);
    fs::write(&json_path, json).with_context(|| format!("Failed to write {}", json_path.display()))?;
    fs::write(&csv_path, csv).with_context(|| format!("Failed to write {}", csv_path.display()))?;
    Ok((json_path, csv_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::TagSet;

    fn record() -> FoaRecord {
        FoaRecord {
            foa_id: "FOA-350693".into(),
            title: "Research, \"Parent\" R01".into(),
            agency: "National Institutes of Health".into(),
            open_date: NaiveDateTime::parse_from_str("2024-01-15T00:00:00", DATE_FORMAT).ok(),
            close_date: None,
            eligibility_text: "Line one\nLine two".into(),
            program_description: String::new(),
            award_range: "$250,000 - $500,000".into(),
            source_url: "https://www.grants.gov/search-results-detail/350693".into(),
            semantic_tags: TagSet {
                research_domains: vec!["health".into(), "science".into()],
                methods: vec![],
                populations: vec!["faculty".into()],
                sponsor_themes: vec!["health_research".into()],
            },
        }
    }

    #[test]
    fn json_field_names_and_nulls() {
        let json = to_json(&[record()]).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["foa_id"], "FOA-350693");
        assert_eq!(v["open_date"], "2024-01-15T00:00:00");
        assert!(v["close_date"].is_null());
        assert_eq!(v["semantic_tags"]["research_domains"][1], "science");
        assert!(v["semantic_tags"]["methods"].as_array().unwrap().is_empty());
        let keys: Vec<&str> = v.as_object().unwrap().keys().map(String::as_str).collect();
        for name in &CSV_HEADER[..9] {
            assert!(keys.contains(name), "missing {}", name);
        }
    }

    #[test]
    fn json_array_for_many() {
        let json = to_json(&[record(), record()]).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v.as_array().unwrap().len(), 2);
    }

    #[test]
    fn json_round_trip() {
        let r = record();
        let back: FoaRecord = serde_json::from_str(&to_json(&[r.clone()]).unwrap()).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn csv_flattens_tags() {
        let row = csv_row(&record());
        assert_eq!(row.len(), CSV_HEADER.len());
        assert_eq!(row[3], "2024-01-15T00:00:00");
        assert_eq!(row[4], "");
        assert_eq!(row[9], "health; science");
        assert_eq!(row[10], "");
        assert_eq!(row[12], "health_research");
    }

    #[test]
    fn csv_quoting() {
        let mut out = Vec::new();
        write_csv(&mut out, &[record()]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.split("\r\n");
        assert_eq!(lines.next().unwrap(), CSV_HEADER.join(","));
        let body = lines.next().unwrap();
        assert!(body.starts_with("FOA-350693,\"Research, \"\"Parent\"\" R01\",National Institutes of Health,"));
        assert!(text.contains("\"Line one\nLine two\""));
        assert!(text.contains("\"$250,000 - $500,000\""));
    }

    #[test]
    fn writes_both_files() {
        let dir = std::env::temp_dir().join(format!("foa_writer_{}", std::process::id()));
        let (json, csv) = write_outputs(&dir, &[record()]).unwrap();
        assert!(json.ends_with(JSON_FILE));
        assert!(fs::read_to_string(&csv).unwrap().starts_with("foa_id,title"));
        let _ = fs::remove_dir_all(&dir);
    }
}
