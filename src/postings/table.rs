// Posting table — the flat CSV file shared with the viewer.
//
// Columns: Title, Company, Location, Experience, Summary, Skills and, once
// any row has been labeled, Predicted_Cluster. A table without the label
// column (or with blank label cells) loads as unlabeled rows; the query
// pipeline routes those through prediction before showing them.

use std::io;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use super::{LabeledPosting, Posting, RawPosting};
use crate::error::{Result, SkillmatchError};

pub const BASE_COLUMNS: [&str; 6] = [
    "Title",
    "Company",
    "Location",
    "Experience",
    "Summary",
    "Skills",
];
pub const CLUSTER_COLUMN: &str = "Predicted_Cluster";

#[derive(Debug, Deserialize)]
struct TableRow {
    #[serde(rename = "Title", default)]
    title: Option<String>,
    #[serde(rename = "Company", default)]
    company: Option<String>,
    #[serde(rename = "Location", default)]
    location: Option<String>,
    #[serde(rename = "Experience", default)]
    experience: Option<String>,
    #[serde(rename = "Summary", default)]
    summary: Option<String>,
    #[serde(rename = "Skills", default)]
    skills: Option<String>,
    #[serde(rename = "Predicted_Cluster", default)]
    cluster: Option<usize>,
}

/// Read raw postings (no label handling) from a CSV file with the table columns.
pub fn read_raw(path: &Path) -> Result<Vec<RawPosting>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut out = Vec::new();
    for record in reader.deserialize() {
        out.push(record?);
    }
    Ok(out)
}

/// Load the labeled posting table.
///
/// A missing or undecodable file is reported as resources unavailable. Rows
/// that lack a required field are skipped with a warning.
pub fn load(path: &Path) -> Result<Vec<LabeledPosting>> {
    if !path.exists() {
        return Err(SkillmatchError::unavailable(path, "posting table not found"));
    }

    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| SkillmatchError::unavailable(path, e.to_string()))?;

    let mut rows = Vec::new();
    for (i, record) in reader.deserialize::<TableRow>().enumerate() {
        let row = record.map_err(|e| SkillmatchError::unavailable(path, e.to_string()))?;
        let raw = RawPosting {
            title: row.title,
            company: row.company,
            location: row.location,
            experience: row.experience,
            summary: row.summary,
            skills: row.skills,
        };
        match Posting::try_from(raw) {
            Ok(posting) => rows.push(LabeledPosting {
                posting,
                cluster: row.cluster,
            }),
            Err(reason) => warn!(row = i + 1, %reason, "Skipping table row"),
        }
    }

    debug!(path = %path.display(), rows = rows.len(), "Loaded posting table");
    Ok(rows)
}

/// Write the table to a file, replacing any previous contents.
pub fn save(path: &Path, rows: &[LabeledPosting]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = std::fs::File::create(path)?;
    write(file, rows)
}

/// Write the table to any writer. The label column is only emitted when at
/// least one row carries a label.
pub fn write<W: io::Write>(out: W, rows: &[LabeledPosting]) -> Result<()> {
    let with_labels = rows.iter().any(|r| r.cluster.is_some());
    let mut writer = csv::Writer::from_writer(out);

    let mut header: Vec<&str> = BASE_COLUMNS.to_vec();
    if with_labels {
        header.push(CLUSTER_COLUMN);
    }
    writer.write_record(&header)?;

    for row in rows {
        let p = &row.posting;
        let mut record = vec![
            p.title.clone(),
            p.company.clone(),
            p.location.clone(),
            p.experience.clone(),
            p.summary.clone(),
            p.raw_skills.clone(),
        ];
        if with_labels {
            record.push(row.cluster.map(|c| c.to_string()).unwrap_or_default());
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(title: &str, skills: &str) -> Posting {
        Posting {
            title: title.to_string(),
            company: "Acme, Inc.".to_string(),
            location: "Bengaluru".to_string(),
            experience: "3-5 years".to_string(),
            summary: "Builds \"things\"".to_string(),
            raw_skills: skills.to_string(),
        }
    }

    #[test]
    fn test_save_and_load_labeled_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.csv");
        let rows = vec![
            LabeledPosting {
                posting: posting("Data Engineer", "Python, SQL"),
                cluster: Some(1),
            },
            LabeledPosting {
                posting: posting("Analyst", ""),
                cluster: Some(0),
            },
        ];

        save(&path, &rows).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded, rows);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Title,Company,Location,Experience,Summary,Skills,Predicted_Cluster"));
    }

    #[test]
    fn test_unlabeled_table_omits_cluster_column() {
        let mut buf = Vec::new();
        write(&mut buf, &[LabeledPosting::unlabeled(posting("QA", "Java"))]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(header, "Title,Company,Location,Experience,Summary,Skills");
    }

    #[test]
    fn test_table_without_label_column_loads_unlabeled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("daily_jobs.csv");
        std::fs::write(
            &path,
            "Title,Company,Location,Experience,Summary,Skills\n\
             ML Engineer,Acme,Pune,2 years,,\"Python, PyTorch\"\n",
        )
        .unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].cluster, None);
        assert_eq!(loaded[0].posting.raw_skills, "Python, PyTorch");
    }

    #[test]
    fn test_rows_missing_required_fields_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.csv");
        std::fs::write(
            &path,
            "Title,Company,Location,Experience,Summary,Skills\n\
             ,Acme,Pune,2 years,,Python\n\
             Dev,Acme,Pune,2 years,,Rust\n",
        )
        .unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].posting.title, "Dev");
    }

    #[test]
    fn test_missing_table_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("nope.csv")).unwrap_err();
        assert!(err.is_unavailable());
    }
}
