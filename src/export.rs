use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};

use crate::data_models::{JobRecord, SearchRequest};
use crate::error::Result;

/// Column order of every tabular export.
pub const COLUMNS: [&str; 7] = [
    "job_title",
    "company_name",
    "job_location",
    "time_posted",
    "num_applicants",
    "job_url",
    "job_description_preview",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    JsonLines,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::JsonLines => "jsonl",
        }
    }
}

/// Header row followed by one row per record. Absent fields are empty cells.
pub fn write_csv<W: Write>(writer: W, records: &[JobRecord]) -> Result<()> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv.write_record(COLUMNS)?;
    for record in records {
        csv.serialize(record)?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_json_lines<W: Write>(mut writer: W, records: &[JobRecord]) -> Result<()> {
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `records` to `path`, replacing whatever was there.
pub fn save(path: &Path, records: &[JobRecord], format: ExportFormat) -> Result<PathBuf> {
    let file = BufWriter::new(File::create(path)?);
    match format {
        ExportFormat::Csv => write_csv(file, records)?,
        ExportFormat::JsonLines => write_json_lines(file, records)?,
    }
    tracing::info!(path = %path.display(), rows = records.len(), "results saved");
    Ok(path.to_path_buf())
}

/// `<title>_<location>_<n>jobs_<YYYYMMDD_HHMMSS>.<ext>`
pub fn default_filename<Tz>(request: &SearchRequest, now: DateTime<Tz>, format: ExportFormat) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}_{}_{}jobs_{}.{}",
        request.title().replace(' ', "_"),
        request.location().replace(' ', "_"),
        request.target_count(),
        now.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Append the format's extension unless the name already ends with it.
pub fn normalize_filename(name: &str, format: ExportFormat) -> String {
    let suffix = format!(".{}", format.extension());
    if name.ends_with(&suffix) {
        name.to_string()
    } else {
        format!("{name}{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_models::DatePosted;
    use chrono::Utc;

    #[test]
    fn test_default_filename_shape() {
        let request =
            SearchRequest::new("Python Developer", "New York", 25, DatePosted::Week, []).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            default_filename(&request, now, ExportFormat::Csv),
            "Python_Developer_New_York_25jobs_20240309_140507.csv"
        );
    }

    #[test]
    fn test_normalize_appends_extension_once() {
        assert_eq!(normalize_filename("jobs", ExportFormat::Csv), "jobs.csv");
        assert_eq!(normalize_filename("jobs.csv", ExportFormat::Csv), "jobs.csv");
        assert_eq!(
            normalize_filename("jobs.csv", ExportFormat::JsonLines),
            "jobs.csv.jsonl"
        );
    }
}
