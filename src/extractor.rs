//! Best-effort field extraction from a detail document.
//!
//! Which elements carry which field is kept in a [`SelectorTable`]: an
//! ordered list of CSS selector strategies per field. When the upstream
//! markup drifts, the table changes; the extraction walk below does not.

use std::fmt;

use scraper::{ElementRef, Html, Selector};

use crate::data_models::JobRecord;
use crate::error::{Result, ScrapeError};

pub const PREVIEW_CHARS: usize = 200;
pub const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    CompanyName,
    Location,
    PostedAgo,
    ApplicantCount,
    Description,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Title,
        Field::CompanyName,
        Field::Location,
        Field::PostedAgo,
        Field::ApplicantCount,
        Field::Description,
    ];
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Title => "title",
            Field::CompanyName => "company_name",
            Field::Location => "location",
            Field::PostedAgo => "posted_ago",
            Field::ApplicantCount => "applicant_count",
            Field::Description => "description",
        };
        f.write_str(name)
    }
}

/// Selector rows matching the guest job-posting markup, primary first.
pub const STANDARD_ROWS: &[(Field, &[&str])] = &[
    (
        Field::Title,
        &[
            "h2.top-card-layout__title",
            "h1.top-card-layout__title",
            "h2.topcard__title",
            "h1.topcard__title",
        ],
    ),
    (
        Field::CompanyName,
        &[
            "a.topcard__org-name-link",
            "span.topcard__flavor > a",
            "span.topcard__flavor",
        ],
    ),
    (
        Field::Location,
        &[
            "span.topcard__flavor--bullet:not(.num-applicants__caption)",
            "span.topcard__flavor--bullet",
        ],
    ),
    (
        Field::PostedAgo,
        &["span.posted-time-ago__text", "span.posted-time-ago__text--new"],
    ),
    (
        Field::ApplicantCount,
        &["span.num-applicants__caption", "figcaption.num-applicants__caption"],
    ),
    (
        Field::Description,
        &["div.show-more-less-html__markup", "div.description__text"],
    ),
];

struct Strategy {
    source: String,
    selector: Selector,
}

struct FieldRule {
    field: Field,
    strategies: Vec<Strategy>,
}

/// Field → ordered selector strategies. Fields without a row are never
/// populated.
pub struct SelectorTable {
    rules: Vec<FieldRule>,
}

impl SelectorTable {
    pub fn standard() -> Result<SelectorTable> {
        SelectorTable::from_rows(STANDARD_ROWS)
    }

    /// Every selector is parsed up front; a bad one fails the whole table.
    /// Repeated rows for a field append to its strategy list.
    pub fn from_rows(rows: &[(Field, &[&str])]) -> Result<SelectorTable> {
        let mut table = SelectorTable { rules: Vec::new() };
        for (field, selectors) in rows {
            for raw in selectors.iter() {
                table.push(*field, raw)?;
            }
        }
        Ok(table)
    }

    /// Append a fallback strategy for `field`.
    pub fn push(&mut self, field: Field, raw: &str) -> Result<()> {
        let selector = Selector::parse(raw).map_err(|err| ScrapeError::Selector {
            selector: raw.to_string(),
            message: err.to_string(),
        })?;
        let strategy = Strategy {
            source: raw.to_string(),
            selector,
        };
        match self.rules.iter_mut().find(|rule| rule.field == field) {
            Some(rule) => rule.strategies.push(strategy),
            None => self.rules.push(FieldRule {
                field,
                strategies: vec![strategy],
            }),
        }
        Ok(())
    }

    /// The selector strings tried for `field`, in order.
    pub fn strategies(&self, field: Field) -> Vec<&str> {
        self.rule(field)
            .map(|rule| rule.strategies.iter().map(|s| s.source.as_str()).collect())
            .unwrap_or_default()
    }

    fn rule(&self, field: Field) -> Option<&FieldRule> {
        self.rules.iter().find(|rule| rule.field == field)
    }

    fn first_match(&self, document: &Html, field: Field) -> Option<String> {
        let rule = self.rule(field)?;
        rule.strategies.iter().find_map(|strategy| {
            document
                .select(&strategy.selector)
                .map(|element| text_content(&element))
                .find(|text| !text.is_empty())
        })
    }
}

impl fmt::Debug for SelectorTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for rule in &self.rules {
            map.entry(&rule.field, &self.strategies(rule.field));
        }
        map.finish()
    }
}

/// The optional part of a [`JobRecord`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub posted_ago: Option<String>,
    pub applicant_count: Option<String>,
    pub description_preview: Option<String>,
}

impl ExtractedFields {
    pub fn into_record(self, url: impl Into<String>) -> JobRecord {
        JobRecord {
            title: self.title,
            company_name: self.company_name,
            location: self.location,
            posted_ago: self.posted_ago,
            applicant_count: self.applicant_count,
            url: url.into(),
            description_preview: self.description_preview,
        }
    }

    pub fn present_count(&self) -> usize {
        [
            &self.title,
            &self.company_name,
            &self.location,
            &self.posted_ago,
            &self.applicant_count,
            &self.description_preview,
        ]
        .iter()
        .filter(|field| field.is_some())
        .count()
    }
}

pub fn extract(document: &Html, table: &SelectorTable) -> ExtractedFields {
    ExtractedFields {
        title: table.first_match(document, Field::Title),
        company_name: table.first_match(document, Field::CompanyName),
        location: table.first_match(document, Field::Location),
        posted_ago: table.first_match(document, Field::PostedAgo),
        applicant_count: table.first_match(document, Field::ApplicantCount),
        description_preview: table
            .first_match(document, Field::Description)
            .map(|text| truncate_preview(&text)),
    }
}

pub fn extract_html(html: &str, table: &SelectorTable) -> ExtractedFields {
    extract(&Html::parse_document(html), table)
}

/// First [`PREVIEW_CHARS`] characters plus [`ELLIPSIS`], or the text as is
/// when it already fits.
pub fn truncate_preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}

/// Element text with whitespace runs collapsed to single spaces.
fn text_content(element: &ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL_HTML: &str = r##"
<html><body>
  <section class="top-card-layout">
    <h2 class="top-card-layout__title font-sans text-lg papabear:text-xl font-bold leading-open text-color-text mb-0 topcard__title">
      Senior Rust Engineer
    </h2>
    <h4 class="top-card-layout__second-subline">
      <span class="topcard__flavor">
        <a class="topcard__org-name-link topcard__flavor--black-link" href="#"> Ferrous Systems </a>
      </span>
      <span class="topcard__flavor topcard__flavor--bullet">Berlin, Germany</span>
      <span class="posted-time-ago__text topcard__flavor--metadata">2 days ago</span>
      <span class="num-applicants__caption topcard__flavor--metadata topcard__flavor--bullet">
        Over 200 applicants
      </span>
    </h4>
  </section>
  <div class="show-more-less-html__markup">  Build   compilers.  </div>
</body></html>"##;

    #[test]
    fn test_extracts_every_field_from_standard_markup() {
        let table = SelectorTable::standard().unwrap();
        let fields = extract_html(DETAIL_HTML, &table);
        assert_eq!(fields.title.as_deref(), Some("Senior Rust Engineer"));
        assert_eq!(fields.company_name.as_deref(), Some("Ferrous Systems"));
        assert_eq!(fields.location.as_deref(), Some("Berlin, Germany"));
        assert_eq!(fields.posted_ago.as_deref(), Some("2 days ago"));
        assert_eq!(fields.applicant_count.as_deref(), Some("Over 200 applicants"));
        assert_eq!(fields.description_preview.as_deref(), Some("Build compilers."));
    }

    #[test]
    fn test_standard_table_covers_every_field() {
        let table = SelectorTable::standard().unwrap();
        for field in Field::ALL {
            assert!(!table.strategies(field).is_empty(), "no selectors for {field}");
        }
    }

    #[test]
    fn test_missing_elements_are_absent() {
        let table = SelectorTable::standard().unwrap();
        let fields = extract_html("<html><body><p>nothing here</p></body></html>", &table);
        assert_eq!(fields, ExtractedFields::default());
        let record = fields.into_record("https://example.com/jobs/view/1");
        assert_eq!(record, JobRecord::bare("https://example.com/jobs/view/1"));
    }

    #[test]
    fn test_fallback_selector_used_when_primary_missing() {
        let table = SelectorTable::standard().unwrap();
        let html = r#"<h1 class="topcard__title">Platform Engineer</h1>"#;
        let fields = extract_html(html, &table);
        assert_eq!(fields.title.as_deref(), Some("Platform Engineer"));
    }

    #[test]
    fn test_empty_primary_match_falls_through() {
        let table = SelectorTable::from_rows(&[(Field::Title, &["h2.title", "h3.title"])]).unwrap();
        let html = r#"<h2 class="title">   </h2><h3 class="title">Backup</h3>"#;
        assert_eq!(extract_html(html, &table).title.as_deref(), Some("Backup"));
    }

    #[test]
    fn test_custom_table_swaps_markup_without_code_change() {
        let table = SelectorTable::from_rows(&[
            (Field::Title, &["div[data-role=title]"]),
            (Field::CompanyName, &["div[data-role=org]"]),
        ])
        .unwrap();
        let html = r#"<div data-role="title">SRE</div><div data-role="org">Acme</div>"#;
        let fields = extract_html(html, &table);
        assert_eq!(fields.title.as_deref(), Some("SRE"));
        assert_eq!(fields.company_name.as_deref(), Some("Acme"));
        assert_eq!(fields.location, None);
        assert_eq!(fields.present_count(), 2);
    }

    #[test]
    fn test_invalid_selector_rejected_at_build() {
        let err = SelectorTable::from_rows(&[(Field::Title, &["h2[["])]).unwrap_err();
        assert!(matches!(err, ScrapeError::Selector { ref selector, .. } if selector == "h2[["));
    }

    #[test]
    fn test_strategies_are_inspectable_in_order() {
        let mut table = SelectorTable::from_rows(&[(Field::Location, &["span.loc"])]).unwrap();
        table.push(Field::Location, "div.loc").unwrap();
        assert_eq!(table.strategies(Field::Location), vec!["span.loc", "div.loc"]);
        assert!(table.strategies(Field::Title).is_empty());
    }

    #[test]
    fn test_long_description_truncated_with_marker() {
        let text = "x".repeat(250);
        let preview = truncate_preview(&text);
        assert_eq!(preview.chars().count(), PREVIEW_CHARS + ELLIPSIS.len());
        assert!(preview.ends_with(ELLIPSIS));
        assert_eq!(&preview[..PREVIEW_CHARS], &text[..PREVIEW_CHARS]);
    }

    #[test]
    fn test_short_description_untouched() {
        let text = "y".repeat(150);
        assert_eq!(truncate_preview(&text), text);
        let exact = "z".repeat(PREVIEW_CHARS);
        assert_eq!(truncate_preview(&exact), exact);
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let text = "é".repeat(201);
        let preview = truncate_preview(&text);
        assert_eq!(preview, format!("{}{ELLIPSIS}", "é".repeat(200)));
    }
}
