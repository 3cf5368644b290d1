use std::time::Duration;

use chrono::Utc;
use reqwest::{header::CONTENT_TYPE, Method, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use super::filter::{param_pairs, ListFilter, QueryParams};
use super::models::{
    Department, Departments, Job, JobItem, JobItems, Jobs, Location, LocationType, LocationTypes,
    Locations,
};
use super::token::{BearerToken, TokenResponse};
use super::{UpstreamApi, UpstreamError};

const API_PREFIX: &str = "api/v1";
const TOKEN_SCOPE: &str = "openapi";

/// Connection settings for the upstream API
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub auth_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub timeout: Duration,
}

/// HTTP client for the upstream job API
///
/// Holds the client-credentials bearer token. The token is fetched lazily,
/// reused until it expires and refreshed once when a request comes back with
/// `401 Unauthorized`.
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
    auth_url: Url,
    client_id: String,
    client_secret: String,
    token: Mutex<Option<BearerToken>>,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        let auth_url = Url::parse(&config.auth_url)?;
        // Validates the base url early, endpoints are built from the trimmed string
        Url::parse(&config.base_url)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_url,
            client_id: config.client_id,
            client_secret: config.client_secret,
            token: Mutex::new(None),
        })
    }

    /// Make sure a usable bearer token is available
    pub async fn authenticate(&self) -> Result<(), UpstreamError> {
        self.bearer().await.map(|_| ())
    }

    /// Build the url of an API resource, encoding the given query pairs
    pub(crate) fn endpoint(&self, path: &str, pairs: &[(&str, String)]) -> Result<Url, UpstreamError> {
        let mut url = Url::parse(&format!("{}/{API_PREFIX}/{path}", self.base_url))?;
        if !pairs.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(pairs.iter().map(|(key, value)| (*key, value.as_str())));
        }
        Ok(url)
    }

    /// Current bearer token, fetching a new one if none is cached or it expired
    async fn bearer(&self) -> Result<String, UpstreamError> {
        let mut token = self.token.lock().await;

        if let Some(current) = token.as_ref().filter(|t| !t.is_expired(Utc::now())) {
            return Ok(current.access_token.clone());
        }

        let fresh = self.fetch_token().await?;
        let access_token = fresh.access_token.clone();
        *token = Some(fresh);

        Ok(access_token)
    }

    /// Drop the cached token if it is still the one that was rejected
    async fn invalidate(&self, rejected: &str) {
        let mut token = self.token.lock().await;
        if token.as_ref().is_some_and(|t| t.access_token == rejected) {
            *token = None;
        }
    }

    async fn fetch_token(&self) -> Result<BearerToken, UpstreamError> {
        debug!("Requesting bearer token from {}", self.auth_url);

        let response = self
            .http
            .post(self.auth_url.clone())
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "client_credentials"),
                ("scope", TOKEN_SCOPE),
            ])
            .send()
            .await
            .map_err(UpstreamError::TokenRequest)?;

        if response.status() != StatusCode::OK {
            return Err(UpstreamError::TokenStatus(response.status()));
        }

        let body = response.bytes().await.map_err(UpstreamError::TokenRequest)?;
        let token = serde_json::from_slice::<TokenResponse>(&body)?
            .into_token(Utc::now())
            .ok_or(UpstreamError::MissingAccessToken)?;

        info!("Obtained upstream bearer token, valid until {}", token.expires_at);
        Ok(token)
    }

    /// Send an authenticated request, re-authenticating once on 401
    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&Job>,
    ) -> Result<T, UpstreamError> {
        let mut retried = false;

        loop {
            let bearer = self.bearer().await?;
            debug!("{} {}", method, url);

            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .bearer_auth(&bearer)
                .header(CONTENT_TYPE, "application/json");
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request.send().await?;

            match response.status() {
                status if status == StatusCode::UNAUTHORIZED && !retried => {
                    warn!("Upstream rejected bearer token for {}, re-authenticating", url);
                    self.invalidate(&bearer).await;
                    retried = true;
                }
                status if status == StatusCode::UNAUTHORIZED => {
                    return Err(UpstreamError::Unauthorized)
                }
                status if status.is_success() => {
                    let bytes = response.bytes().await?;
                    return Ok(serde_json::from_slice(&bytes)?);
                }
                status => return Err(UpstreamError::Status(status)),
            }
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        pairs: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let url = self.endpoint(path, pairs)?;
        self.send(Method::GET, url, None).await
    }
}

impl UpstreamApi for UpstreamClient {
    async fn get_department(&self, id: i64) -> Result<Department, UpstreamError> {
        self.get(&format!("departments/{id}"), &[]).await
    }

    async fn get_departments(&self, filter: &ListFilter) -> Result<Departments, UpstreamError> {
        self.get("departments", &filter.query_pairs()).await
    }

    async fn get_location(&self, id: i64) -> Result<Location, UpstreamError> {
        self.get(&format!("locations/{id}"), &[]).await
    }

    async fn get_locations(&self, params: &QueryParams) -> Result<Locations, UpstreamError> {
        self.get("locations", &param_pairs(params)).await
    }

    async fn get_location_types(&self) -> Result<LocationTypes, UpstreamError> {
        self.get("locationTypes", &[]).await
    }

    async fn get_location_type(&self, id: i64) -> Result<LocationType, UpstreamError> {
        self.get(&format!("locationTypes/{id}"), &[]).await
    }

    async fn get_job_item(&self, id: i64) -> Result<JobItem, UpstreamError> {
        self.get(&format!("jobitems/{id}"), &[]).await
    }

    async fn get_job_items(&self, filter: &ListFilter) -> Result<JobItems, UpstreamError> {
        self.get("jobitems", &filter.query_pairs()).await
    }

    async fn get_job(&self, id: i64) -> Result<Job, UpstreamError> {
        self.get(&format!("jobs/{id}"), &[]).await
    }

    async fn get_jobs(&self, params: &QueryParams) -> Result<Jobs, UpstreamError> {
        self.get("jobs", &param_pairs(params)).await
    }

    async fn create_job(&self, job: &Job) -> Result<Job, UpstreamError> {
        let url = self.endpoint("jobs", &[])?;
        self.send(Method::POST, url, Some(job)).await
    }
}
