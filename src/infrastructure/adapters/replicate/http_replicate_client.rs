//! HTTP Replicate Client - 调用 Replicate predictions API
//!
//! 实现 InferenceJobPort trait
//!
//! Replicate API:
//! POST {base}/predictions                          {"version": "...", "input": {...}}
//! POST {base}/models/{owner}/{name}/predictions    {"input": {...}}（未指定版本时）
//! GET  {base}/predictions/{id}
//! POST {base}/predictions/{id}/cancel

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::{json, Value};
use std::time::Duration;

use crate::application::ports::{
    InferenceJobPort, JobStatus, Prediction, RemoteJobError, TryOnJobInput,
};
use crate::domain::tryon::{OutputUrl, PredictionId};

/// IDM-VTON 模型
pub const DEFAULT_MODEL: &str =
    "cuuupid/idm-vton:0513734a452173b8173e907e3a59d19a36266e55b48528559432bd21c7d7e985";

/// Replicate 客户端配置
#[derive(Debug, Clone)]
pub struct HttpReplicateClientConfig {
    /// API 基础 URL
    pub api_base: String,
    /// API token，为空时调用直接失败
    pub api_token: String,
    /// 模型引用 `owner/name[:version]`
    pub model: String,
    /// 轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 单次 HTTP 请求超时（秒）
    pub timeout_secs: u64,
}

impl Default for HttpReplicateClientConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.replicate.com/v1".to_string(),
            api_token: String::new(),
            model: DEFAULT_MODEL.to_string(),
            poll_interval_ms: 500,
            timeout_secs: 60,
        }
    }
}

impl HttpReplicateClientConfig {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            ..Default::default()
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }
}

/// 模型引用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRef {
    pub owner: String,
    pub name: String,
    pub version: Option<String>,
}

impl ModelRef {
    pub fn parse(model: &str) -> Result<Self, RemoteJobError> {
        let (path, version) = match model.split_once(':') {
            Some((path, version)) if !version.is_empty() => (path, Some(version.to_string())),
            Some((path, _)) => (path, None),
            None => (model, None),
        };

        match path.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() => Ok(Self {
                owner: owner.to_string(),
                name: name.to_string(),
                version,
            }),
            _ => Err(RemoteJobError::InvalidResponse(format!(
                "Invalid model reference: {}",
                model
            ))),
        }
    }
}

/// Replicate HTTP 客户端
pub struct HttpReplicateClient {
    client: Client,
    config: HttpReplicateClientConfig,
    model: ModelRef,
}

impl HttpReplicateClient {
    pub fn new(config: HttpReplicateClientConfig) -> Result<Self, RemoteJobError> {
        let model = ModelRef::parse(&config.model)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RemoteJobError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            config,
            model,
        })
    }

    fn base(&self) -> &str {
        self.config.api_base.trim_end_matches('/')
    }

    fn token(&self) -> Result<&str, RemoteJobError> {
        if self.config.api_token.is_empty() {
            return Err(RemoteJobError::MissingToken);
        }
        Ok(&self.config.api_token)
    }

    fn create_request(&self, input: &TryOnJobInput) -> (String, Value) {
        match &self.model.version {
            Some(version) => (
                format!("{}/predictions", self.base()),
                json!({ "version": version, "input": input }),
            ),
            None => (
                format!(
                    "{}/models/{}/{}/predictions",
                    self.base(),
                    self.model.owner,
                    self.model.name
                ),
                json!({ "input": input }),
            ),
        }
    }

    /// 发送请求并解析为 Prediction
    async fn send(&self, request: RequestBuilder) -> Result<Prediction, RemoteJobError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                RemoteJobError::Timeout
            } else if e.is_connect() {
                RemoteJobError::NetworkError(format!("Cannot connect to Replicate: {}", e))
            } else {
                RemoteJobError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Replicate 的错误体一般是 {"detail": "..."}
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("detail").and_then(Value::as_str).map(str::to_string))
                .unwrap_or(body);
            return Err(RemoteJobError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Prediction>()
            .await
            .map_err(|e| RemoteJobError::InvalidResponse(e.to_string()))
    }

    /// 按路径段拼接 URL，预测 ID 作为单个段转义
    fn prediction_url(&self, segments: &[&str]) -> Result<Url, RemoteJobError> {
        let mut url = Url::parse(self.base())
            .map_err(|e| RemoteJobError::NetworkError(format!("Invalid API base: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| RemoteJobError::NetworkError("Invalid API base".to_string()))?
            .pop_if_empty()
            .push("predictions")
            .extend(segments);
        Ok(url)
    }

    async fn fetch(&self, id: &str) -> Result<Prediction, RemoteJobError> {
        let token = self.token()?;
        let url = self.prediction_url(&[id])?;
        self.send(self.client.get(url).bearer_auth(token)).await
    }

    /// 轮询直到离开 starting/processing，不设整体超时
    async fn wait(&self, mut prediction: Prediction) -> Result<Prediction, RemoteJobError> {
        let interval = Duration::from_millis(self.config.poll_interval_ms);
        while !prediction.status.is_terminal() {
            tokio::time::sleep(interval).await;
            prediction = self.fetch(&prediction.id).await?;
            tracing::debug!(
                prediction_id = %prediction.id,
                status = prediction.status.as_str(),
                "Polled prediction"
            );
        }
        Ok(prediction)
    }

    fn into_output(prediction: Prediction) -> Result<OutputUrl, RemoteJobError> {
        match prediction.status {
            JobStatus::Succeeded => {
                let output = prediction
                    .output
                    .filter(|v| !v.is_null())
                    .ok_or_else(|| {
                        RemoteJobError::InvalidResponse(format!(
                            "Prediction {} succeeded without output",
                            prediction.id
                        ))
                    })?;
                serde_json::from_value::<OutputUrl>(output)
                    .map_err(|e| RemoteJobError::InvalidResponse(format!("Unexpected output: {}", e)))
            }
            JobStatus::Canceled => Err(RemoteJobError::PredictionCanceled(prediction.id)),
            status => {
                let error = match prediction.error {
                    Some(Value::String(message)) => message,
                    Some(Value::Null) | None if status == JobStatus::Failed => {
                        "unknown error".to_string()
                    }
                    Some(Value::Null) | None => format!("ended with status '{}'", status.as_str()),
                    Some(other) => other.to_string(),
                };
                Err(RemoteJobError::PredictionFailed {
                    id: prediction.id,
                    error,
                })
            }
        }
    }
}

#[async_trait]
impl InferenceJobPort for HttpReplicateClient {
    async fn submit(&self, input: &TryOnJobInput) -> Result<OutputUrl, RemoteJobError> {
        let token = self.token()?;
        let (url, body) = self.create_request(input);

        tracing::debug!(url = %url, "Creating prediction");

        let prediction = self
            .send(self.client.post(&url).bearer_auth(token).json(&body))
            .await?;

        tracing::info!(
            prediction_id = %prediction.id,
            status = prediction.status.as_str(),
            "Prediction created"
        );

        let prediction = self.wait(prediction).await?;

        tracing::info!(
            prediction_id = %prediction.id,
            status = prediction.status.as_str(),
            "Prediction finished"
        );

        Self::into_output(prediction)
    }

    async fn get_status(&self, id: &PredictionId) -> Result<Prediction, RemoteJobError> {
        self.fetch(id.as_str()).await
    }

    async fn cancel(&self, id: &PredictionId) -> Result<Prediction, RemoteJobError> {
        let token = self.token()?;
        let url = self.prediction_url(&[id.as_str(), "cancel"])?;
        self.send(self.client.post(url).bearer_auth(token)).await
    }
}
