//! Job catalog: resolves each job's advancement branches to their final tier.

use crate::api::GameApi;
use crate::error::{RequestError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Upper bound on `next` hops per branch. Real chains are a handful of tiers;
/// anything longer is treated as corrupt (possibly cyclic) upstream data.
pub const MAX_CHAIN_DEPTH: usize = 64;

/// jobId to its resolved entry.
pub type Catalog = BTreeMap<String, JobEntry>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobEntry {
    pub job_name: String,
    /// jobGrowId to jobGrowName, terminal tiers only.
    pub job_grows: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct JobList {
    rows: Vec<RawJob>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawJob {
    job_id: String,
    job_name: String,
    #[serde(default)]
    rows: Vec<JobGrowNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobGrowNode {
    job_grow_id: String,
    job_grow_name: String,
    #[serde(default)]
    next: Option<Box<JobGrowNode>>,
}

impl JobGrowNode {
    /// Follows `next` until a node has none.
    fn terminal(&self) -> Result<&JobGrowNode, RequestError> {
        let mut current = self;
        let mut hops = 0;
        while let Some(next) = current.next.as_deref() {
            hops += 1;
            if hops > MAX_CHAIN_DEPTH {
                return Err(RequestError::ChainTooDeep(self.job_grow_id.clone()));
            }
            current = next;
        }
        Ok(current)
    }
}

/// Fetches the job list once and keeps the final tier of every branch.
pub fn resolve_jobs(api: &impl GameApi) -> Result<Catalog> {
    let raw = api.jobs()?;
    let list: JobList = serde_json::from_value(raw).map_err(|source| {
        tracing::error!(error = %source, "unexpected /jobs response");
        RequestError::Decode {
            url: "/jobs".into(),
            source,
        }
    })?;

    let mut catalog = Catalog::new();
    for job in list.rows {
        let mut job_grows = BTreeMap::new();
        for branch in &job.rows {
            let last = branch.terminal()?;
            job_grows.insert(last.job_grow_id.clone(), last.job_grow_name.clone());
        }
        tracing::debug!(job = %job.job_name, branches = job_grows.len(), "resolved job");
        catalog.insert(
            job.job_id,
            JobEntry {
                job_name: job.job_name,
                job_grows,
            },
        );
    }

    tracing::info!(jobs = catalog.len(), "job catalog resolved");
    Ok(catalog)
}
