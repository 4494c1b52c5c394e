use anyhow::Result;
use tempfile::TempDir;

use jobharvest::data_models::JobRecord;
use jobharvest::export::{self, COLUMNS, ExportFormat};

fn sample_records() -> Vec<JobRecord> {
    vec![
        JobRecord {
            title: Some("Rust Engineer".into()),
            company_name: Some("Acme, Inc.".into()),
            location: Some("Remote".into()),
            posted_ago: Some("3 days ago".into()),
            applicant_count: None,
            url: "https://www.linkedin.com/jobs/view/1".into(),
            description_preview: Some("Build \"fast\" things".into()),
        },
        JobRecord::bare("https://www.linkedin.com/jobs/view/2"),
    ]
}

#[test]
fn test_csv_has_fixed_columns_and_empty_cells_for_absent_fields() -> Result<()> {
    let mut out = Vec::new();
    export::write_csv(&mut out, &sample_records())?;
    let text = String::from_utf8(out)?;
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], COLUMNS.join(","));
    assert_eq!(
        lines[1],
        r#"Rust Engineer,"Acme, Inc.",Remote,3 days ago,,https://www.linkedin.com/jobs/view/1,"Build ""fast"" things""#
    );
    assert_eq!(lines[2], ",,,,,https://www.linkedin.com/jobs/view/2,");
    Ok(())
}

#[test]
fn test_empty_csv_still_has_header() -> Result<()> {
    let mut out = Vec::new();
    export::write_csv(&mut out, &[])?;
    assert_eq!(String::from_utf8(out)?.trim_end(), COLUMNS.join(","));
    Ok(())
}

#[test]
fn test_json_lines_uses_column_names() -> Result<()> {
    let mut out = Vec::new();
    export::write_json_lines(&mut out, &sample_records())?;
    let text = String::from_utf8(out)?;
    let first: serde_json::Value = serde_json::from_str(text.lines().next().unwrap_or_default())?;

    assert_eq!(first["job_title"], "Rust Engineer");
    assert_eq!(first["job_url"], "https://www.linkedin.com/jobs/view/1");
    assert!(first["num_applicants"].is_null());
    assert_eq!(text.lines().count(), 2);
    Ok(())
}

#[test]
fn test_save_overwrites_existing_file() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("jobs.csv");
    std::fs::write(&path, "stale contents that are much longer than the new export\n".repeat(50))?;

    export::save(&path, &sample_records()[1..], ExportFormat::Csv)?;

    let text = std::fs::read_to_string(&path)?;
    assert!(!text.contains("stale"));
    assert_eq!(text.lines().count(), 2);
    Ok(())
}
