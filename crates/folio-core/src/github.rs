//! Turns a saved GitHub "list user repositories" response into the project
//! document the site loads from `github-projects.yml`.

use std::path::Path;

use chrono::DateTime;
use chrono::SecondsFormat;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::tile::Traffic;

pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];
const PROJECT_IMAGE_DIR: &str = "assets/images/projects";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid repository listing: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to encode projects document: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GitHubRepo {
    pub name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub homepage: Option<String>,
    pub language: Option<String>,
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub topics: Option<Vec<String>>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub pushed_at: Option<String>,
    pub traffic: Option<Traffic>,
}

impl GitHubRepo {
    fn has_description(&self) -> bool {
        self.description
            .as_deref()
            .is_some_and(|text| !text.trim().is_empty())
    }
}

/// `stars * 3 + recency * 2 + has_description`, truncated. Recency decays
/// from 10 to 0 over roughly 300 days since the last push.
pub fn calculate_priority(repo: &GitHubRepo, now: DateTime<Utc>) -> i64 {
    let stars = repo.stargazers_count as f64;
    let description = if repo.has_description() { 1.0 } else { 0.0 };
    let recency = repo
        .pushed_at
        .as_deref()
        .and_then(|pushed| DateTime::parse_from_rfc3339(pushed).ok())
        .map(|pushed| {
            let days = (now - pushed.with_timezone(&Utc)).num_days() as f64;
            (10.0 - days / 30.0).max(0.0)
        })
        .unwrap_or(0.0);
    (stars * 3.0 + recency * 2.0 + description) as i64
}

/// `steam-hours` becomes `Steam Hours`. Every alphabetic run is capitalized.
pub fn title_from_name(name: &str) -> String {
    let spaced = name.replace(['-', '_'], " ");
    let mut title = String::with_capacity(spaced.len());
    let mut in_word = false;
    for ch in spaced.chars() {
        if ch.is_alphabetic() {
            if in_word {
                title.extend(ch.to_lowercase());
            } else {
                title.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            title.push(ch);
            in_word = false;
        }
    }
    title
}

pub fn find_project_image(site_root: &Path, name: &str) -> Option<String> {
    IMAGE_EXTENSIONS.iter().find_map(|ext| {
        let file = format!("{name}.{ext}");
        site_root
            .join(PROJECT_IMAGE_DIR)
            .join(&file)
            .is_file()
            .then(|| format!("./{PROJECT_IMAGE_DIR}/{file}"))
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub title: String,
    pub description: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub topics: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pushed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traffic: Option<Traffic>,
    pub priority: i64,
    pub tags: Vec<String>,
    pub featured: bool,
    pub span_columns: u32,
    pub span_rows: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectsMetadata {
    pub generated_at: String,
    pub source_api: String,
    pub total_repos: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectsDocument {
    pub metadata: ProjectsMetadata,
    pub projects: Vec<ProjectRecord>,
}

impl ProjectsDocument {
    pub fn to_yaml(&self) -> Result<String, ImportError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

pub fn project_record(
    repo: GitHubRepo,
    site_root: Option<&Path>,
    now: DateTime<Utc>,
) -> ProjectRecord {
    let priority = calculate_priority(&repo, now);
    let image = site_root.and_then(|root| find_project_image(root, &repo.name));
    let topics = repo.topics.unwrap_or_default();
    let language = repo.language.filter(|language| !language.trim().is_empty());
    let mut tags: Vec<String> = language.iter().map(|language| language.to_lowercase()).collect();
    tags.extend(topics.iter().cloned());
    ProjectRecord {
        id: repo.name.clone(),
        kind: "project".to_string(),
        title: title_from_name(&repo.name),
        description: repo.description.unwrap_or_default(),
        url: repo.html_url,
        homepage: repo.homepage.filter(|homepage| !homepage.trim().is_empty()),
        image,
        language,
        stars: repo.stargazers_count,
        forks: repo.forks_count,
        topics,
        created_at: repo.created_at,
        updated_at: repo.updated_at,
        pushed_at: repo.pushed_at,
        traffic: repo.traffic,
        priority,
        tags,
        featured: repo.stargazers_count > 5,
        span_columns: 1,
        span_rows: 1,
        name: repo.name,
    }
}

pub fn parse_repos(json: &str) -> Result<Vec<GitHubRepo>, ImportError> {
    Ok(serde_json::from_str(json)?)
}

/// Builds the document from a parsed listing. A non-empty `curated` list keeps
/// only the named repositories. Projects are ordered by priority, highest
/// first, ties in listing order.
pub fn build_projects_document(
    repos: Vec<GitHubRepo>,
    curated: &[String],
    site_root: Option<&Path>,
    now: DateTime<Utc>,
) -> ProjectsDocument {
    let source_api = repos
        .iter()
        .find_map(|repo| owner_from_url(&repo.html_url))
        .map(|owner| format!("https://api.github.com/users/{owner}/repos"))
        .unwrap_or_else(|| "https://api.github.com/user/repos".to_string());

    let mut projects: Vec<ProjectRecord> = repos
        .into_iter()
        .filter(|repo| curated.is_empty() || curated.iter().any(|name| *name == repo.name))
        .map(|repo| project_record(repo, site_root, now))
        .collect();
    projects.sort_by(|a, b| b.priority.cmp(&a.priority));

    ProjectsDocument {
        metadata: ProjectsMetadata {
            generated_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            source_api,
            total_repos: projects.len(),
        },
        projects,
    }
}

fn owner_from_url(html_url: &str) -> Option<&str> {
    let rest = html_url
        .strip_prefix("https://github.com/")
        .or_else(|| html_url.strip_prefix("http://github.com/"))?;
    rest.split('/').next().filter(|owner| !owner.is_empty())
}
