use crate::error::CatalogError;
use crate::model::Subject;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub name: String,
    pub topics: Vec<String>,
}

/// Read-only Subject -> Chapter -> Topics tree.
///
/// Chapter and topic order follow the source document. Subjects missing from
/// the document behave as subjects with no chapters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    subjects: BTreeMap<Subject, Vec<Chapter>>,
}

impl Catalog {
    /// Parse `{ "Physics": { "Chapter": ["Topic", ...] }, ... }`.
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let root: Value = serde_json::from_str(text)?;
        let Value::Object(root) = root else {
            return Err(CatalogError::Shape(
                "top level must be an object of subjects".to_string(),
            ));
        };

        let mut subjects = BTreeMap::new();
        for (subject_name, chapters) in root {
            let Some(subject) = Subject::from_name(&subject_name) else {
                tracing::warn!(subject = %subject_name, "Skipping unknown subject in catalog");
                continue;
            };
            let Value::Object(chapters) = chapters else {
                return Err(CatalogError::Shape(format!(
                    "'{subject_name}' must map chapter names to topic lists"
                )));
            };

            let mut parsed = Vec::with_capacity(chapters.len());
            for (chapter_name, topics) in chapters {
                let Value::Array(topics) = topics else {
                    return Err(CatalogError::Shape(format!(
                        "'{subject_name}/{chapter_name}' must be a list of topics"
                    )));
                };
                let topics = topics
                    .into_iter()
                    .map(|topic| match topic {
                        Value::String(s) => Ok(s),
                        other => Err(CatalogError::Shape(format!(
                            "'{subject_name}/{chapter_name}' has a non-text topic: {other}"
                        ))),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                parsed.push(Chapter {
                    name: chapter_name,
                    topics,
                });
            }
            subjects.insert(subject, parsed);
        }

        Ok(Catalog { subjects })
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.values().all(|chapters| chapters.is_empty())
    }

    /// Chapters of a subject, empty when the subject is absent.
    pub fn chapters(&self, subject: Subject) -> &[Chapter] {
        self.subjects
            .get(&subject)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn topics(&self, subject: Subject, chapter: &str) -> Option<&[String]> {
        self.chapters(subject)
            .iter()
            .find(|c| c.name == chapter)
            .map(|c| c.topics.as_slice())
    }

    pub fn topic_count(&self, subject: Subject) -> usize {
        self.chapters(subject).iter().map(|c| c.topics.len()).sum()
    }
}

// ============================================================
// Loader
// ============================================================

/// Where the catalog document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    File(PathBuf),
    Remote(Url),
}

impl CatalogSource {
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            if let Ok(url) = Url::parse(trimmed) {
                return CatalogSource::Remote(url);
            }
        }
        CatalogSource::File(PathBuf::from(trimmed))
    }
}

impl Default for CatalogSource {
    fn default() -> Self {
        CatalogSource::File(PathBuf::from("subjects.json"))
    }
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogSource::File(path) => write!(f, "{}", path.display()),
            CatalogSource::Remote(url) => write!(f, "{url}"),
        }
    }
}

pub fn build_client() -> Result<reqwest::Client, CatalogError> {
    Ok(reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent(concat!("studyplanner/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Single load attempt; callers fall back to an empty catalog on error.
pub async fn load_catalog(
    client: &reqwest::Client,
    source: &CatalogSource,
) -> Result<Catalog, CatalogError> {
    let text = match source {
        CatalogSource::File(path) => {
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| CatalogError::Io {
                    path: path.clone(),
                    source,
                })?
        }
        CatalogSource::Remote(url) => {
            let resp = client.get(url.clone()).send().await?;
            if !resp.status().is_success() {
                return Err(CatalogError::Status(resp.status()));
            }
            resp.text().await?
        }
    };

    let catalog = Catalog::from_json(&text)?;
    tracing::info!(
        %source,
        subjects = catalog.subjects.len(),
        "Loaded catalog"
    );
    Ok(catalog)
}
