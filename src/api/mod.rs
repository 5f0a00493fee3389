//! 任务 REST 客户端
//!
//! 创建生成任务（multipart 图片上传 + 可选提示词）、轮询任务状态、
//! 在介入门等待时提交人工反馈。流核心自身从不调用这些接口，
//! 由上层（监控器/界面）使用；本层只需要任务 ID 去开 WebSocket。

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ClientError;

/// 创建任务响应（POST /tasks/）
#[derive(Debug, Clone, Deserialize)]
pub struct TaskCreated {
    pub task_id: String,
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// 任务状态响应（GET /tasks/{id}）
#[derive(Debug, Clone, Deserialize)]
pub struct TaskStatus {
    pub task_id: String,
    /// queued | processing | completed | failed | unknown
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    /// 进度百分比（0-100）
    #[serde(default)]
    pub progress: u8,
    /// 当前管线步骤（失败时为 -1）
    #[serde(default)]
    pub current_step: i32,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub thumbnail_path: Option<String>,
}

impl TaskStatus {
    /// 是否已到终态
    pub fn is_terminal(&self) -> bool {
        matches!(self.status.as_str(), "completed" | "failed")
    }
}

/// REST 客户端：基地址 + 可选 X-API-Key
#[derive(Clone)]
pub struct TaskApiClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl TaskApiClient {
    pub fn new(base_url: &str, api_key: Option<String>, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        }
    }

    fn with_key(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.header("X-API-Key", key),
            None => req,
        }
    }

    /// 上传图片并创建任务（后端限制最多 4 张）
    pub async fn create_task(
        &self,
        image_paths: &[impl AsRef<Path>],
        prompt: &str,
    ) -> Result<TaskCreated, ClientError> {
        let mut form = reqwest::multipart::Form::new().text("prompt", prompt.to_string());
        for path in image_paths {
            let path = path.as_ref();
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| ClientError::ApiRequest(format!("read {}: {}", path.display(), e)))?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image.jpg".to_string());
            form = form.part(
                "files",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name),
            );
        }

        let req = self
            .client
            .post(format!("{}/tasks/", self.base_url))
            .multipart(form);
        let resp = self
            .with_key(req)
            .send()
            .await
            .map_err(|e| ClientError::ApiRequest(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ClientError::ApiResponse(format!("HTTP {}", resp.status())));
        }
        resp.json()
            .await
            .map_err(|e| ClientError::ApiResponse(e.to_string()))
    }

    /// 查询任务状态
    pub async fn get_status(&self, task_id: &str) -> Result<TaskStatus, ClientError> {
        let req = self.client.get(format!("{}/tasks/{}", self.base_url, task_id));
        let resp = self
            .with_key(req)
            .send()
            .await
            .map_err(|e| ClientError::ApiRequest(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ClientError::ApiResponse(format!("HTTP {}", resp.status())));
        }
        resp.json()
            .await
            .map_err(|e| ClientError::ApiResponse(e.to_string()))
    }

    /// 提交人工反馈（介入门等待时；后端据此恢复被挂起的管线）
    pub async fn submit_feedback(&self, task_id: &str, feedback: &str) -> Result<(), ClientError> {
        let req = self
            .client
            .post(format!("{}/tasks/{}/feedback", self.base_url, task_id))
            .json(&serde_json::json!({ "feedback": feedback }));
        let resp = self
            .with_key(req)
            .send()
            .await
            .map_err(|e| ClientError::ApiRequest(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ClientError::ApiResponse(format!("HTTP {}", resp.status())));
        }
        Ok(())
    }
}
