//! Turns a saved resume page into the resume tile document, plus the detail
//! records the static build renders into one page per entry.

use std::collections::BTreeMap;
use std::collections::HashSet;

use chrono::DateTime;
use chrono::SecondsFormat;
use chrono::Utc;
use scraper::ElementRef;
use scraper::Html;
use scraper::Selector;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::tile::slugify;

pub const RESUME_DETAILS_FILE: &str = "resume-details.yml";

#[derive(Debug, Error)]
pub enum ResumeError {
    #[error("invalid selector `{selector}`: {detail}")]
    Selector {
        selector: &'static str,
        detail: String,
    },
    #[error("resume document: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeSection {
    Experience,
    Education,
}

/// Class names the resume page marks each section with.
struct SectionMarkup {
    section: &'static str,
    article: &'static str,
    header: &'static str,
    location: &'static str,
    role: &'static str,
    dates: &'static str,
}

impl ResumeSection {
    pub const ALL: [ResumeSection; 2] = [Self::Experience, Self::Education];

    pub fn label(self) -> &'static str {
        match self {
            Self::Experience => "experience",
            Self::Education => "education",
        }
    }

    fn tags(self) -> [&'static str; 2] {
        match self {
            Self::Experience => ["experience", "professional"],
            Self::Education => ["education", "academic"],
        }
    }

    /// Entries count down from here in page order.
    fn top_priority(self) -> i64 {
        match self {
            Self::Experience => 100,
            Self::Education => 90,
        }
    }

    fn organization_key(self) -> &'static str {
        match self {
            Self::Experience => "company",
            Self::Education => "school",
        }
    }

    fn role_key(self) -> &'static str {
        match self {
            Self::Experience => "title",
            Self::Education => "degree",
        }
    }

    fn markup(self) -> SectionMarkup {
        match self {
            Self::Experience => SectionMarkup {
                section: "section.experience",
                article: "article.job",
                header: "header.job-header",
                location: "div.job-location",
                role: "div.job-title",
                dates: "div.job-dates",
            },
            Self::Education => SectionMarkup {
                section: "section.education",
                article: "article.degree",
                header: "header.degree-header",
                location: "div.degree-location",
                role: "div.degree-title",
                dates: "div.degree-dates",
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeEntry {
    pub section: ResumeSection,
    pub slug: String,
    pub organization: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub dates: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub gpa: String,
    #[serde(default)]
    pub description_html: String,
}

impl ResumeEntry {
    pub fn id(&self) -> String {
        format!("{}-{}", self.section.label(), self.slug)
    }

    /// Where the detail page lives, relative to the site output directory.
    pub fn page_path(&self) -> String {
        format!("writing/{}/{}.html", self.section.label(), self.slug)
    }

    fn meta(&self) -> BTreeMap<String, String> {
        [
            (self.section.organization_key(), &self.organization),
            (self.section.role_key(), &self.role),
            ("location", &self.location),
            ("dates", &self.dates),
            ("gpa", &self.gpa),
        ]
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resume {
    pub entries: Vec<ResumeEntry>,
}

impl Resume {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn section(&self, section: ResumeSection) -> impl Iterator<Item = &ResumeEntry> {
        self.entries
            .iter()
            .filter(move |entry| entry.section == section)
    }
}

/// Extracts experience and education entries. A missing section, or an
/// article without its header, contributes nothing.
pub fn parse_resume(html: &str) -> Result<Resume, ResumeError> {
    let document = Html::parse_document(html);
    let mut entries = Vec::new();
    for section in ResumeSection::ALL {
        entries.extend(parse_section(&document, section)?);
    }
    Ok(Resume { entries })
}

fn parse_section(document: &Html, section: ResumeSection) -> Result<Vec<ResumeEntry>, ResumeError> {
    let markup = section.markup();
    let section_selector = selector(markup.section)?;
    let article_selector = selector(markup.article)?;
    let header_selector = selector(markup.header)?;
    let organization_selector = selector("h3")?;
    let location_selector = selector(markup.location)?;
    let role_selector = selector(markup.role)?;
    let dates_selector = selector(markup.dates)?;
    let gpa_selector = selector("div.gpa")?;

    let Some(root) = document.select(&section_selector).next() else {
        return Ok(Vec::new());
    };

    let mut seen = HashSet::new();
    let mut entries = Vec::new();
    for article in root.select(&article_selector) {
        let Some(header) = article.select(&header_selector).next() else {
            continue;
        };
        let organization = first_text(header, &organization_selector);
        let slug = unique_slug(&organization, entries.len(), &mut seen);
        entries.push(ResumeEntry {
            section,
            slug,
            organization,
            role: first_text(header, &role_selector),
            location: first_text(header, &location_selector),
            dates: first_text(header, &dates_selector),
            gpa: first_text(header, &gpa_selector),
            description_html: description_html(article),
        });
    }
    Ok(entries)
}

fn selector(css: &'static str) -> Result<Selector, ResumeError> {
    Selector::parse(css).map_err(|err| ResumeError::Selector {
        selector: css,
        detail: format!("{err:?}"),
    })
}

fn first_text(scope: ElementRef<'_>, selector: &Selector) -> String {
    scope
        .select(selector)
        .next()
        .map(|element| {
            element
                .text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

/// Every element after the header, serialized. Scripts and styles are left out.
fn description_html(article: ElementRef<'_>) -> String {
    article
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| !matches!(child.value().name(), "header" | "script" | "style"))
        .map(|child| child.html())
        .collect::<Vec<_>>()
        .join("\n")
}

fn unique_slug(name: &str, index: usize, seen: &mut HashSet<String>) -> String {
    let base = match slugify(name) {
        slug if slug.is_empty() => format!("entry-{}", index + 1),
        slug => slug,
    };
    let mut slug = base.clone();
    let mut suffix = 2;
    while !seen.insert(slug.clone()) {
        slug = format!("{base}-{suffix}");
        suffix += 1;
    }
    slug
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResumeTileRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub tags: Vec<String>,
    pub meta: BTreeMap<String, String>,
    pub priority: i64,
    pub featured: bool,
    pub span_columns: u32,
    pub span_rows: u32,
}

pub fn resume_tile(entry: &ResumeEntry, index: usize) -> ResumeTileRecord {
    ResumeTileRecord {
        id: entry.id(),
        kind: entry.section.label().to_string(),
        name: entry.organization.clone(),
        title: entry.organization.clone(),
        description: entry.role.clone(),
        url: format!("./{}", entry.page_path()),
        tags: entry.section.tags().iter().map(|tag| tag.to_string()).collect(),
        meta: entry.meta(),
        priority: entry.section.top_priority() - index as i64,
        featured: true,
        span_columns: 1,
        span_rows: 1,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResumeTilesMetadata {
    pub generated_at: String,
    pub source: String,
    pub total_tiles: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResumeTilesDocument {
    pub metadata: ResumeTilesMetadata,
    pub tiles: Vec<ResumeTileRecord>,
}

impl ResumeTilesDocument {
    pub fn to_yaml(&self) -> Result<String, ResumeError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Experience tiles first, then education, each section in page order.
pub fn build_resume_tiles(resume: &Resume, now: DateTime<Utc>) -> ResumeTilesDocument {
    let tiles: Vec<ResumeTileRecord> = ResumeSection::ALL
        .into_iter()
        .flat_map(move |section| {
            resume
                .section(section)
                .enumerate()
                .map(|(index, entry)| resume_tile(entry, index))
        })
        .collect();
    ResumeTilesDocument {
        metadata: ResumeTilesMetadata {
            generated_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            source: "resume".to_string(),
            total_tiles: tiles.len(),
        },
        tiles,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeDetailsMetadata {
    pub generated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeDetails {
    pub metadata: ResumeDetailsMetadata,
    #[serde(default)]
    pub entries: Vec<ResumeEntry>,
}

impl ResumeDetails {
    pub fn new(resume: &Resume, now: DateTime<Utc>) -> Self {
        Self {
            metadata: ResumeDetailsMetadata {
                generated_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            },
            entries: resume.entries.clone(),
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ResumeError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn to_yaml(&self) -> Result<String, ResumeError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::sources::parse_tile_document;
    use crate::sources::RESUME_TILES_FILE;
    use crate::tile::TileKind;
    use crate::tile::TileSource;

    const RESUME: &str = r#"<!DOCTYPE html>
<html><body>
<section class="experience">
  <article class="job">
    <header class="job-header">
      <h3>Acme Corp.</h3>
      <div class="job-location">Berlin</div>
      <div class="job-title">Staff Engineer</div>
      <div class="job-dates">2021 - Present</div>
    </header>
    <ul><li>Built the ingest pipeline</li></ul>
    <script>track()</script>
  </article>
  <article class="job">
    <header class="job-header">
      <h3>Initech</h3>
      <div class="job-title">Engineer</div>
      <div class="job-dates">2018 - 2021</div>
    </header>
  </article>
  <article class="job">
    <p>No header, so not an entry.</p>
  </article>
</section>
<section class="education">
  <article class="degree">
    <header class="degree-header">
      <h3>University of Somewhere</h3>
      <div class="degree-title">B.Sc. Computer Science</div>
      <div class="degree-dates">2014 - 2018</div>
      <div class="gpa">GPA: 3.8</div>
    </header>
  </article>
</section>
</body></html>"#;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn entries_are_read_from_both_sections() {
        let resume = parse_resume(RESUME).unwrap();
        let ids: Vec<String> = resume.entries.iter().map(ResumeEntry::id).collect();
        assert_eq!(
            ids,
            vec![
                "experience-acme-corp",
                "experience-initech",
                "education-university-of-somewhere",
            ]
        );

        let acme = &resume.entries[0];
        assert_eq!(acme.role, "Staff Engineer");
        assert_eq!(acme.location, "Berlin");
        assert_eq!(acme.description_html, "<ul><li>Built the ingest pipeline</li></ul>");
        assert_eq!(resume.entries[2].gpa, "GPA: 3.8");
    }

    #[test]
    fn priorities_count_down_per_section() {
        let document = build_resume_tiles(&parse_resume(RESUME).unwrap(), now());
        let priorities: Vec<(&str, i64)> = document
            .tiles
            .iter()
            .map(|tile| (tile.id.as_str(), tile.priority))
            .collect();
        assert_eq!(
            priorities,
            vec![
                ("experience-acme-corp", 100),
                ("experience-initech", 99),
                ("education-university-of-somewhere", 90),
            ]
        );
        assert_eq!(document.metadata.total_tiles, 3);
        assert_eq!(document.metadata.source, "resume");
    }

    #[test]
    fn tiles_link_to_their_detail_pages() {
        let document = build_resume_tiles(&parse_resume(RESUME).unwrap(), now());
        let acme = &document.tiles[0];
        assert_eq!(acme.url, "./writing/experience/acme-corp.html");
        assert_eq!(acme.tags, vec!["experience", "professional"]);
        assert_eq!(acme.description, "Staff Engineer");
        assert!(acme.featured);
        assert_eq!(acme.meta.get("company").map(String::as_str), Some("Acme Corp."));
        assert!(!acme.meta.contains_key("gpa"));

        let school = &document.tiles[2];
        assert_eq!(school.tags, vec!["education", "academic"]);
        assert_eq!(school.meta.get("degree").map(String::as_str), Some("B.Sc. Computer Science"));
        assert_eq!(school.meta.get("gpa").map(String::as_str), Some("GPA: 3.8"));
    }

    #[test]
    fn page_without_sections_yields_nothing() {
        let resume = parse_resume("<html><body><p>Hello</p></body></html>").unwrap();
        assert!(resume.is_empty());

        let only_education = parse_resume(
            r#"<section class="experience"></section><section class="education"><article class="degree"><header class="degree-header"><h3>School</h3></header></article></section>"#,
        )
        .unwrap();
        assert_eq!(only_education.section(ResumeSection::Experience).count(), 0);
        assert_eq!(only_education.section(ResumeSection::Education).count(), 1);
    }

    #[test]
    fn repeated_organizations_get_distinct_slugs() {
        let html = r#"<section class="experience">
<article class="job"><header class="job-header"><h3>Acme</h3></header></article>
<article class="job"><header class="job-header"><h3>Acme</h3></header></article>
<article class="job"><header class="job-header"><h3> </h3></header></article>
</section>"#;
        let slugs: Vec<String> = parse_resume(html)
            .unwrap()
            .entries
            .into_iter()
            .map(|entry| entry.slug)
            .collect();
        assert_eq!(slugs, vec!["acme", "acme-2", "entry-3"]);
    }

    #[test]
    fn generated_document_loads_as_resume_tiles() {
        let yaml = build_resume_tiles(&parse_resume(RESUME).unwrap(), now())
            .to_yaml()
            .unwrap();
        let mut notices = Vec::new();
        let tiles = parse_tile_document(
            Path::new(RESUME_TILES_FILE),
            &yaml,
            TileSource::Resume,
            &mut notices,
        )
        .unwrap();
        assert!(notices.is_empty());
        let kinds: Vec<TileKind> = tiles.iter().map(|tile| tile.kind).collect();
        assert_eq!(
            kinds,
            vec![TileKind::Experience, TileKind::Experience, TileKind::Education]
        );
        assert_eq!(tiles[0].meta.get("dates").map(String::as_str), Some("2021 - Present"));
    }

    #[test]
    fn details_survive_a_yaml_round_trip() {
        let details = ResumeDetails::new(&parse_resume(RESUME).unwrap(), now());
        let parsed = ResumeDetails::from_yaml_str(&details.to_yaml().unwrap()).unwrap();
        assert_eq!(parsed, details);
    }
}
