//! Disk-backed skill cache.
//!
//! Every resolved job grow gets one JSON file at
//! `<data_path>/<jobName>/<jobGrowName>.json`. Files that already exist are
//! trusted and never re-fetched; missing ones are built from the API on
//! startup. The in-memory copy is filled once by [`SkillDatabase::populate`]
//! and only read afterwards.

use crate::api::GameApi;
use crate::error::{Error, LookupError, RequestError, Result};
use crate::jobs::Catalog;
use crate::model::{SkillBatch, SkillRecord};
use foldhash::HashMap;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct SkillList {
    skills: Vec<SkillListEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SkillListEntry {
    skill_id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SkillDetail {
    #[serde(rename = "type")]
    skill_type: String,
    level_info: LevelInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LevelInfo {
    option_desc: String,
    rows: Vec<LevelRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LevelRow {
    level: u32,
    /// Kept as sent so numbers are written back in their original form.
    option_value: Map<String, Value>,
}

#[derive(Debug, Default)]
pub struct SkillDatabase {
    data_path: PathBuf,
    /// jobGrowId to its skills. An empty batch marks a job grow whose build
    /// or load failed this run.
    skills: HashMap<String, SkillBatch>,
}

impl SkillDatabase {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            skills: HashMap::default(),
        }
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn cache_path(&self, job_name: &str, job_grow_name: &str) -> PathBuf {
        self.data_path
            .join(job_name)
            .join(format!("{job_grow_name}.json"))
    }

    /// Fills the cache for every job grow in `catalog`, in order.
    ///
    /// Only failing to create the data root aborts; per job-grow failures
    /// leave that entry empty and the pass continues.
    pub fn populate(&mut self, api: &impl GameApi, catalog: &Catalog) -> Result<()> {
        fs::create_dir_all(&self.data_path).map_err(|e| Error::io(&self.data_path, e))?;

        for (job_id, job) in catalog {
            for (job_grow_id, job_grow_name) in &job.job_grows {
                self.ensure_cached(api, job_id, job_grow_id, &job.job_name, job_grow_name);
            }
        }

        tracing::info!(
            job_grows = self.skills.len(),
            skills = self.skills.values().map(|b| b.len()).sum::<usize>(),
            "skill cache ready"
        );
        Ok(())
    }

    /// Loads the cached file for one job grow, or builds and writes it.
    pub fn ensure_cached(
        &mut self,
        api: &impl GameApi,
        job_id: &str,
        job_grow_id: &str,
        job_name: &str,
        job_grow_name: &str,
    ) {
        let path = self.cache_path(job_name, job_grow_name);

        let batch = if path.exists() {
            match read_batch(&path) {
                Ok(batch) => {
                    tracing::debug!(path = %path.display(), skills = batch.len(), "loaded cached skills");
                    batch
                }
                Err(e) => {
                    tracing::error!(job_grow = job_grow_name, error = %e, "failed to load skill file");
                    SkillBatch::new()
                }
            }
        } else {
            let built = fetch_batch(api, job_id, job_grow_id)
                .and_then(|batch| write_batch(&path, &batch).map(|_| batch))
                .map_err(|source| Error::CacheAssembly {
                    job_grow_name: job_grow_name.to_string(),
                    source: Box::new(source),
                });
            match built {
                Ok(batch) => {
                    tracing::info!(path = %path.display(), skills = batch.len(), "cached skills");
                    batch
                }
                Err(e) => {
                    tracing::error!(error = %e, "skipping job grow");
                    SkillBatch::new()
                }
            }
        };

        self.skills.insert(job_grow_id.to_string(), batch);
    }

    /// Cached record for one skill, parsed from its raw entry on each call.
    pub fn skill_record(
        &self,
        job_grow_id: &str,
        skill_id: &str,
    ) -> Result<SkillRecord, LookupError> {
        let batch = self
            .skills
            .get(job_grow_id)
            .filter(|batch| !batch.is_empty())
            .ok_or_else(|| LookupError::JobGrow(job_grow_id.to_string()))?;
        let raw = batch.get(skill_id).ok_or_else(|| LookupError::Skill {
            job_grow_id: job_grow_id.to_string(),
            skill_id: skill_id.to_string(),
        })?;
        SkillRecord::deserialize(raw).map_err(|e| LookupError::Malformed {
            skill_id: skill_id.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn batch(&self, job_grow_id: &str) -> Option<&SkillBatch> {
        self.skills.get(job_grow_id)
    }

    pub fn job_grow_ids(&self) -> impl Iterator<Item = &str> {
        self.skills.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: Value, url: String) -> Result<T> {
    serde_json::from_value(value).map_err(|source| RequestError::Decode { url, source }.into())
}

/// Fetches the skill list and every skill's detail. Any failure discards
/// the whole batch.
fn fetch_batch(api: &impl GameApi, job_id: &str, job_grow_id: &str) -> Result<SkillBatch> {
    let list: SkillList = decode(
        api.skill_list(job_id, job_grow_id)?,
        format!("/skills/{job_id}"),
    )?;

    let mut batch = SkillBatch::new();
    for entry in list.skills {
        let detail: SkillDetail = decode(
            api.skill_detail(job_id, &entry.skill_id)?,
            format!("/skills/{job_id}/{}", entry.skill_id),
        )?;

        let levels: Map<String, Value> = detail
            .level_info
            .rows
            .into_iter()
            .map(|row| (row.level.to_string(), Value::Object(row.option_value)))
            .collect();

        batch.insert(
            entry.skill_id,
            json!({
                "skillName": entry.name,
                "skillType": detail.skill_type,
                "optionDesc": detail.level_info.option_desc,
                "levels": levels,
                "speedCoeff": 1,
                "speedDependency": null
            }),
        );
    }

    Ok(batch)
}

/// Reads a cache file as-is. Only the top level must be a JSON object; the
/// individual entries are checked when they are looked up.
pub fn read_batch(path: &Path) -> Result<SkillBatch> {
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Ok(serde_json::from_str(&content)?)
}

/// Writes through a temporary sibling so a failed write never leaves a
/// truncated cache file that later runs would trust.
pub fn write_batch(path: &Path, batch: &SkillBatch) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    let content = serde_json::to_string_pretty(batch)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content).map_err(|e| Error::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| Error::io(path, e))?;
    Ok(())
}
