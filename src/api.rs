//! Blocking client for the Neople Dungeon & Fighter open API.
//!
//! [`GameApi`] is the seam the rest of the crate talks to: implementors only
//! provide [`GameApi::get`], and the endpoint helpers build on top of it.

use crate::config::Config;
use crate::error::RequestError;
use serde_json::Value;

pub const BASE_URL: &str = "https://api.neople.co.kr/df";

pub trait GameApi {
    /// Issues a GET against `path` (relative to the API root) and parses the
    /// body as JSON. Implementations add the API key themselves.
    fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, RequestError>;

    /// All jobs, each with its advancement branches nested under `rows`.
    fn jobs(&self) -> Result<Value, RequestError> {
        self.get("/jobs", &[])
    }

    fn character_id(&self, server_id: &str, character_name: &str) -> Result<String, RequestError> {
        let data = self.get(
            &format!("/servers/{server_id}/characters"),
            &[("characterName", character_name)],
        )?;
        data.get("rows")
            .and_then(|rows| rows.get(0))
            .and_then(|row| row.get("characterId"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| RequestError::Shape("rows[0].characterId".into()))
    }

    fn character_status(&self, server_id: &str, character_id: &str) -> Result<Value, RequestError> {
        self.get(
            &format!("/servers/{server_id}/characters/{character_id}/status"),
            &[],
        )
    }

    /// The character's current skill-style tree (`skill.style`).
    fn character_skill_style(
        &self,
        server_id: &str,
        character_id: &str,
    ) -> Result<Value, RequestError> {
        let mut data = self.get(
            &format!("/servers/{server_id}/characters/{character_id}/skill/style"),
            &[],
        )?;
        data.get_mut("skill")
            .and_then(|skill| skill.get_mut("style"))
            .map(Value::take)
            .ok_or_else(|| RequestError::Shape("skill.style".into()))
    }

    fn skill_list(&self, job_id: &str, job_grow_id: &str) -> Result<Value, RequestError> {
        self.get(&format!("/skills/{job_id}"), &[("jobGrowId", job_grow_id)])
    }

    fn skill_detail(&self, job_id: &str, skill_id: &str) -> Result<Value, RequestError> {
        self.get(&format!("/skills/{job_id}/{skill_id}"), &[])
    }
}

pub struct NeopleClient {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl NeopleClient {
    pub fn new(config: &Config) -> Result<Self, RequestError> {
        Self::with_base_url(config, BASE_URL)
    }

    pub fn with_base_url(config: &Config, base_url: &str) -> Result<Self, RequestError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| RequestError::Transport {
                url: base_url.to_string(),
                source,
            })?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn fetch(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Value, RequestError> {
        let query = params
            .iter()
            .copied()
            .chain(std::iter::once(("apikey", self.api_key.as_str())));
        let url = reqwest::Url::parse_with_params(endpoint, query)
            .map_err(|_| RequestError::Url(endpoint.to_string()))?;

        let response = self
            .http
            .get(url)
            .send()
            .map_err(|source| RequestError::Transport {
                url: endpoint.to_string(),
                source: source.without_url(),
            })?;
        if !response.status().is_success() {
            return Err(RequestError::Status {
                url: endpoint.to_string(),
                status: response.status(),
            });
        }

        let text = response.text().map_err(|source| RequestError::Transport {
            url: endpoint.to_string(),
            source: source.without_url(),
        })?;
        serde_json::from_str(&text).map_err(|source| RequestError::Decode {
            url: endpoint.to_string(),
            source,
        })
    }
}

impl GameApi for NeopleClient {
    fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, RequestError> {
        // The endpoint string never carries the key, so it is safe to log.
        let endpoint = format!("{}{}", self.base_url, path);
        tracing::debug!(%endpoint, "GET");

        let result = self.fetch(&endpoint, params);
        if let Err(e) = &result {
            tracing::error!(%endpoint, error = %e, "API request failed");
        }
        result
    }
}
