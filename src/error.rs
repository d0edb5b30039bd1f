//! Error types shared by the API client, the skill cache and the loaders.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Required configuration is missing or empty.
    #[error("missing configuration: {0}")]
    Config(&'static str),

    #[error(transparent)]
    Request(#[from] RequestError),

    /// A job-grow's skill batch could not be assembled or written.
    #[error("failed to build skill cache for {job_grow_name}: {source}")]
    CacheAssembly {
        job_grow_name: String,
        #[source]
        source: Box<Error>,
    },

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A failed call against the remote API.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("malformed JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The response parsed but lacked a field the caller depends on.
    #[error("unexpected response shape: missing `{0}`")]
    Shape(String),

    #[error("invalid request url {0}")]
    Url(String),

    #[error("advancement chain starting at job grow {0} exceeds the depth limit")]
    ChainTooDeep(String),
}

/// A record that is not present in the in-memory skill cache.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("job grow {0} has no cached skills")]
    JobGrow(String),

    #[error("skill {skill_id} not found for job grow {job_grow_id}")]
    Skill {
        job_grow_id: String,
        skill_id: String,
    },

    #[error("cached skill {skill_id} is malformed: {reason}")]
    Malformed { skill_id: String, reason: String },

    #[error("skill {skill_id} has a non-numeric level key {level:?}")]
    InvalidLevel { skill_id: String, level: String },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
