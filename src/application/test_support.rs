//! 测试替身：记录调用的存储后端与脚本化推理客户端

use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use crate::application::ports::{
    EndpointInfo, InferenceJobPort, JobStatus, Prediction, RemoteJobError, StorageBackendPort,
    StorageDescriptor, StorageError, StorageKind, TryOnJobInput,
};
use crate::domain::tryon::{OutputUrl, PredictionId};

pub struct RecordingStorage {
    kind: StorageKind,
    configured: bool,
    failing: Vec<String>,
    upload_delay: Duration,
    delete_result: bool,
    uploads: Mutex<Vec<String>>,
    deletes: Mutex<Vec<String>>,
}

impl RecordingStorage {
    pub fn remote() -> Self {
        Self::with_kind(StorageKind::Remote)
    }

    pub fn local() -> Self {
        Self::with_kind(StorageKind::Local)
    }

    fn with_kind(kind: StorageKind) -> Self {
        Self {
            kind,
            configured: true,
            failing: Vec::new(),
            upload_delay: Duration::ZERO,
            delete_result: true,
            uploads: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
        }
    }

    pub fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    pub fn fail_upload_of(mut self, basename: &str) -> Self {
        self.failing.push(basename.to_string());
        self
    }

    pub fn with_upload_delay(mut self, delay: Duration) -> Self {
        self.upload_delay = delay;
        self
    }

    pub fn with_delete_result(mut self, result: bool) -> Self {
        self.delete_result = result;
        self
    }

    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }

    fn base_url(&self) -> &'static str {
        match self.kind {
            StorageKind::Remote => "https://bucket.test/uploads",
            StorageKind::Local => "http://localhost:3000/uploads",
        }
    }
}

#[async_trait]
impl StorageBackendPort for RecordingStorage {
    fn kind(&self) -> StorageKind {
        self.kind
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn upload_file(
        &self,
        local_path: &Path,
        _name: Option<&str>,
    ) -> Result<String, StorageError> {
        let basename = local_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        if self.failing.contains(&basename) {
            return Err(StorageError::UploadFailed(format!(
                "simulated failure for {}",
                basename
            )));
        }

        if !self.upload_delay.is_zero() {
            tokio::time::sleep(self.upload_delay).await;
        }

        self.uploads
            .lock()
            .unwrap()
            .push(local_path.to_string_lossy().to_string());
        Ok(format!("{}/{}", self.base_url(), basename))
    }

    async fn delete_file(&self, public_url: &str) -> bool {
        self.deletes.lock().unwrap().push(public_url.to_string());
        self.delete_result
    }

    fn describe(&self) -> StorageDescriptor {
        StorageDescriptor {
            kind: self.kind,
            configured: self.configured,
            initialized: self.configured,
            endpoint: EndpointInfo::Url {
                url: self.base_url().to_string(),
            },
        }
    }
}

pub enum Script {
    Succeed(OutputUrl),
    Fail(&'static str),
}

pub struct ScriptedInference {
    script: Script,
    submit_delay: Duration,
    submitted: Mutex<Vec<TryOnJobInput>>,
}

impl ScriptedInference {
    pub fn succeeding(output: &str) -> Self {
        Self::new(Script::Succeed(OutputUrl::Single(output.to_string())))
    }

    pub fn failing(error: &'static str) -> Self {
        Self::new(Script::Fail(error))
    }

    pub fn new(script: Script) -> Self {
        Self {
            script,
            submit_delay: Duration::ZERO,
            submitted: Mutex::new(Vec::new()),
        }
    }

    /// 模拟远端任务耗时
    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = delay;
        self
    }

    pub fn submitted(&self) -> Vec<TryOnJobInput> {
        self.submitted.lock().unwrap().clone()
    }

    fn prediction(id: &PredictionId, status: JobStatus) -> Prediction {
        Prediction {
            id: id.to_string(),
            status,
            output: None,
            error: None,
            created_at: Some("2024-01-01T00:00:00Z".to_string()),
            completed_at: None,
        }
    }
}

#[async_trait]
impl InferenceJobPort for ScriptedInference {
    async fn submit(&self, input: &TryOnJobInput) -> Result<OutputUrl, RemoteJobError> {
        self.submitted.lock().unwrap().push(input.clone());
        if !self.submit_delay.is_zero() {
            tokio::time::sleep(self.submit_delay).await;
        }
        match &self.script {
            Script::Succeed(output) => Ok(output.clone()),
            Script::Fail(error) => Err(RemoteJobError::PredictionFailed {
                id: "pred-1".to_string(),
                error: error.to_string(),
            }),
        }
    }

    async fn get_status(&self, id: &PredictionId) -> Result<Prediction, RemoteJobError> {
        Ok(Self::prediction(id, JobStatus::Processing))
    }

    async fn cancel(&self, id: &PredictionId) -> Result<Prediction, RemoteJobError> {
        Ok(Self::prediction(id, JobStatus::Canceled))
    }
}
