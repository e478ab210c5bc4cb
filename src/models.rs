use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier of a job ad. `Reference` is the literal Kenn-Nr. printed on the
/// listing; `Derived` is a content hash computed when no reference is present.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum JobId {
    Reference(String),
    Derived(String),
}

impl JobId {
    pub fn as_str(&self) -> &str {
        match self {
            JobId::Reference(id) | JobId::Derived(id) => id,
        }
    }

    pub fn is_authoritative(&self) -> bool {
        matches!(self, JobId::Reference(_))
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A job ad as found on the listing page, before dedup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobAdCandidate {
    pub id: JobId,
    pub title: String,
    pub document_url: String,
    pub job_type: String,
    pub deadline: Option<NaiveDate>,
    pub raw_text: String,
}

/// One row of the `job_ads` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobAdRecord {
    pub id: String,
    pub title: String,
    pub full_text: String,
    pub job_type: String,
    pub deadline: Option<NaiveDate>,
}

impl JobAdRecord {
    pub fn from_candidate(candidate: &JobAdCandidate, full_text: String) -> Self {
        Self {
            id: candidate.id.as_str().to_string(),
            title: candidate.title.clone(),
            full_text,
            job_type: candidate.job_type.clone(),
            deadline: candidate.deadline,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedCandidate {
    pub id: String,
    pub title: String,
    pub reason: String,
}

/// What one harvest run did. Serialized as-is by `--json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub location: String,
    pub job_type: Option<String>,
    pub found: usize,
    pub inserted: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<FailedCandidate>,
    pub committed: bool,
}
