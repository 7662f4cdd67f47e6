use std::collections::HashMap;

use serde::{de::DeserializeOwned, Serialize};
use url::Url;

pub use lumistrip_protocol::{
    AnimationInfo, AnimationToRunParams, RunningAnimationParams, Section, StripInfo,
};

#[derive(Debug, thiserror::Error)]
pub enum HttpClientError {
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("controller returned an invalid response: {reason}")]
    InvalidResponse { reason: String },
}

type Result<T> = std::result::Result<T, HttpClientError>;

/// Request/response convenience client for the controller's REST API.
/// Each operation is one HTTP call; for the streaming interface use
/// `lumistrip-client` instead.
#[derive(Clone)]
pub struct LedStripHttpClient {
    endpoint: Url,
    client: reqwest::Client,
}

impl LedStripHttpClient {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        self.endpoint.join(path).unwrap().to_string()
    }

    async fn send_request<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T> {
        request
            .send()
            .await
            .map_err(|e| HttpClientError::InvalidRequest {
                reason: e.to_string(),
            })?
            .json::<T>()
            .await
            .map_err(|e| HttpClientError::InvalidResponse {
                reason: e.to_string(),
            })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        Self::send_request::<T>(self.client.get(self.url(path))).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, req: &impl Serialize) -> Result<T> {
        Self::send_request::<T>(self.client.post(self.url(path)).json(req)).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        Self::send_request::<T>(self.client.delete(self.url(path))).await
    }

    pub async fn get_animation_info(&self, name: &str) -> Result<AnimationInfo> {
        self.get(&format!("animation/{name}")).await
    }

    pub async fn get_supported_animations(&self) -> Result<Vec<AnimationInfo>> {
        self.get("animations").await
    }

    pub async fn get_supported_animations_names(&self) -> Result<Vec<String>> {
        self.get("animations/names").await
    }

    pub async fn get_running_animations(&self) -> Result<HashMap<String, RunningAnimationParams>> {
        self.get("running").await
    }

    pub async fn get_running_animation_ids(&self) -> Result<Vec<String>> {
        self.get("running/ids").await
    }

    pub async fn get_running_animation_params(&self, id: &str) -> Result<RunningAnimationParams> {
        self.get(&format!("running/{id}")).await
    }

    pub async fn start_animation(
        &self,
        params: &AnimationToRunParams,
    ) -> Result<RunningAnimationParams> {
        self.post("start", params).await
    }

    /// Ends a running animation; returns the params it was running with.
    pub async fn end_animation(&self, id: &str) -> Result<RunningAnimationParams> {
        self.delete(&format!("running/{id}")).await
    }

    pub async fn get_sections(&self) -> Result<Vec<Section>> {
        self.get("sections").await
    }

    pub async fn get_section(&self, name: &str) -> Result<Section> {
        self.get(&format!("section/{name}")).await
    }

    pub async fn create_new_section(&self, section: &Section) -> Result<Section> {
        self.post("sections", section).await
    }

    pub async fn get_strip_info(&self) -> Result<StripInfo> {
        self.get("strip/info").await
    }

    pub async fn get_current_strip_color(&self) -> Result<Vec<u32>> {
        self.get("strip/color").await
    }

    pub async fn clear_strip(&self) -> Result<()> {
        self.post("strip/clear", &()).await
    }
}

impl Default for LedStripHttpClient {
    fn default() -> Self {
        Self::new(Url::parse("http://localhost:8080/").unwrap())
    }
}
