use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::data_models::{DatePosted, ExperienceLevel, JobRecord, SearchRequest};
use crate::enumerator::StopReason;
use crate::error::RequestError;
use crate::export::ExportFormat;
use crate::pipeline::{RunReport, RunSummary};

const SAMPLE_SIZE: usize = 5;

#[derive(Debug, Parser)]
#[command(name = "jobharvest", about = "Collect public job postings into a CSV file")]
pub struct Args {
    /// Job role or title, e.g. "Python Developer"
    pub title: String,

    /// Job location, e.g. "Toronto" or "Remote"
    pub location: String,

    /// How many postings to collect
    #[arg(short = 'n', long, default_value_t = 25)]
    pub count: usize,

    #[arg(short, long, value_enum, default_value_t = DateArg::Week)]
    pub date: DateArg,

    /// Comma separated; omit for any level
    #[arg(short, long, value_enum, value_delimiter = ',')]
    pub experience: Vec<ExperienceArg>,

    /// Output file; generated from the search when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = FormatArg::Csv)]
    pub format: FormatArg,

    /// Proceed with more than 100 postings without asking
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DateArg {
    Any,
    Day,
    Week,
    Month,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExperienceArg {
    Any,
    Internship,
    Entry,
    Associate,
    MidSenior,
    Director,
    Executive,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Csv,
    Jsonl,
}

impl From<DateArg> for DatePosted {
    fn from(arg: DateArg) -> Self {
        match arg {
            DateArg::Any => DatePosted::Any,
            DateArg::Day => DatePosted::Day,
            DateArg::Week => DatePosted::Week,
            DateArg::Month => DatePosted::Month,
        }
    }
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Jsonl => ExportFormat::JsonLines,
        }
    }
}

/// `any` anywhere in the list wins; `all` selects every concrete level.
pub fn resolve_experience(args: &[ExperienceArg]) -> Vec<ExperienceLevel> {
    if args.contains(&ExperienceArg::Any) {
        return Vec::new();
    }
    if args.contains(&ExperienceArg::All) {
        return ExperienceLevel::ALL.to_vec();
    }
    args.iter()
        .filter_map(|arg| match arg {
            ExperienceArg::Internship => Some(ExperienceLevel::Internship),
            ExperienceArg::Entry => Some(ExperienceLevel::EntryLevel),
            ExperienceArg::Associate => Some(ExperienceLevel::Associate),
            ExperienceArg::MidSenior => Some(ExperienceLevel::MidSenior),
            ExperienceArg::Director => Some(ExperienceLevel::Director),
            ExperienceArg::Executive => Some(ExperienceLevel::Executive),
            ExperienceArg::Any | ExperienceArg::All => None,
        })
        .collect()
}

impl Args {
    pub fn to_request(&self) -> Result<SearchRequest, RequestError> {
        SearchRequest::new(
            self.title.as_str(),
            self.location.as_str(),
            self.count,
            self.date.into(),
            resolve_experience(&self.experience),
        )
    }
}

pub fn print_search_summary(request: &SearchRequest, output: &std::path::Path) {
    println!("Search summary");
    println!("  Job title:   {}", request.title());
    println!("  Location:    {}", request.location());
    println!("  Max jobs:    {}", request.target_count());
    println!("  Output file: {}", output.display());
    println!("  Posted in:   {}", request.date_posted().describe());
    let levels = request.experience_levels();
    if levels.is_empty() {
        println!("  Experience:  Any level");
    } else {
        let names: Vec<&str> = levels.iter().map(|level| level.label()).collect();
        println!("  Experience:  {}", names.join(", "));
    }
}

fn or_unknown(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("Unknown")
}

pub fn print_sample(records: &[JobRecord]) {
    for (i, job) in records.iter().take(SAMPLE_SIZE).enumerate() {
        println!();
        println!("{}. {}", i + 1, job.title.as_deref().unwrap_or("Unknown Title"));
        println!("   Company:    {}", job.company_name.as_deref().unwrap_or("Unknown Company"));
        println!("   Location:   {}", job.location.as_deref().unwrap_or("Unknown Location"));
        println!("   Posted:     {}", or_unknown(&job.posted_ago));
        println!("   Applicants: {}", or_unknown(&job.applicant_count));
        println!("   Apply:      {}", job.url);
        if let Some(description) = &job.description_preview {
            println!("   {description}");
        }
    }
    if records.len() > SAMPLE_SIZE {
        println!();
        println!("... and {} more jobs", records.len() - SAMPLE_SIZE);
    }
}

pub fn print_outcome(report: &RunReport) {
    println!("{}", outcome_message(report));
}

pub fn outcome_message(report: &RunReport) -> String {
    match report.summary() {
        RunSummary::NoResults => "No results: the search returned no job listings.".to_string(),
        RunSummary::SearchFailed => {
            let reason = match &report.enumeration.stop {
                StopReason::Transport { message } => message.as_str(),
                _ => "unknown error",
            };
            format!(
                "Search failed: the listing service could not be reached or refused the request ({reason})."
            )
        }
        RunSummary::Complete => {
            format!("Collected {} of {} jobs.", report.succeeded(), report.attempted)
        }
        RunSummary::Partial => format!(
            "Partial results: {} of {} jobs collected ({} skipped{}).",
            report.succeeded(),
            report.attempted,
            report.skipped.len(),
            if report.interrupted { ", interrupted" } else { "" }
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enumerator::Enumeration;
    use crate::progress::OutcomeTally;

    fn empty_report(stop: StopReason) -> RunReport {
        RunReport {
            records: Vec::new(),
            enumeration: Enumeration {
                ids: Vec::new(),
                stop,
                pages_requested: 1,
                duplicates: 0,
                malformed_entries: 0,
            },
            attempted: 0,
            skipped: Vec::new(),
            tally: OutcomeTally::default(),
            interrupted: false,
        }
    }

    #[test]
    fn test_parses_comma_separated_levels() {
        let args = Args::try_parse_from([
            "jobharvest",
            "Rust Developer",
            "Remote",
            "-n",
            "3",
            "--experience",
            "entry,mid-senior",
        ])
        .unwrap();
        let request = args.to_request().unwrap();
        assert_eq!(request.experience_token().as_deref(), Some("2,4"));
        assert_eq!(request.date_posted(), DatePosted::Week);
        assert_eq!(request.target_count(), 3);
    }

    #[test]
    fn test_any_overrides_other_levels() {
        assert!(resolve_experience(&[ExperienceArg::Director, ExperienceArg::Any]).is_empty());
        assert_eq!(resolve_experience(&[ExperienceArg::All]).len(), 6);
    }

    #[test]
    fn test_zero_count_is_rejected() {
        let args = Args::try_parse_from(["jobharvest", "Rust", "Remote", "-n", "0"]).unwrap();
        assert_eq!(args.to_request(), Err(RequestError::ZeroTargetCount));
    }

    #[test]
    fn test_failed_search_is_not_reported_as_no_results() {
        let throttled = empty_report(StopReason::Transport {
            message: "unexpected HTTP status 429 during `search_page`".into(),
        });
        assert_eq!(throttled.summary(), RunSummary::SearchFailed);
        let message = outcome_message(&throttled);
        assert!(message.starts_with("Search failed"), "{message}");
        assert!(message.contains("429"));

        let empty = empty_report(StopReason::EmptyPage);
        assert_eq!(empty.summary(), RunSummary::NoResults);
        assert!(outcome_message(&empty).starts_with("No results"));
    }
}
