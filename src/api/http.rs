use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::ClassroomApi;
use crate::config::BackendConfig;
use crate::errors::{ClassroomError, Result};
use crate::models::{
    DeleteResponse, ErrorBody, ListEnvelope, assignments::entities::Assignment,
    comments::entities::Comment, posts::requests::MessageRequest,
    submissions::requests::SubmitAssignmentRequest,
};

/// 基于 reqwest 的后端客户端
///
/// `with_credentials` 打开时启用 Cookie 存储，会话 Cookie 随每个请求发送。
#[derive(Clone)]
pub struct HttpClassroomApi {
    http: reqwest::Client,
    base: Url,
}

impl HttpClassroomApi {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url).map_err(|e| {
            ClassroomError::config(format!("Invalid backend URL '{}': {e}", config.base_url))
        })?;
        if base.cannot_be_a_base() {
            return Err(ClassroomError::config(format!(
                "Backend URL '{}' cannot be used as a base",
                config.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .cookie_store(config.with_credentials)
            .user_agent(config.user_agent.clone())
            .build()?;

        debug!("HttpClassroomApi created for {}", base);
        Ok(Self { http, base })
    }

    /// 在根地址后追加路径段，段内字符会被转义
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ClassroomError::config(format!("Backend URL '{}' cannot be a base", self.base))
            })?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }
}

/// 把非 2xx 响应转换为错误：有 message 用 message，否则记录状态码
fn error_from_status(status: StatusCode, body: &str) -> ClassroomError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty());

    match message {
        Some(message) => ClassroomError::server(message),
        None if status == StatusCode::NOT_FOUND => {
            ClassroomError::not_found(format!("HTTP {status}"))
        }
        None => ClassroomError::http(format!("HTTP {status}")),
    }
}

/// 只关心状态码的接口（响应体不透明）
async fn expect_success(response: Response) -> Result<()> {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(error_from_status(status, &body));
    }
    debug!("Response {} body: {}", status, body);
    Ok(())
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(error_from_status(status, &body));
    }
    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl ClassroomApi for HttpClassroomApi {
    async fn delete_class(&self, class_id: &str) -> Result<()> {
        let url = self.endpoint(&["class", class_id])?;
        debug!("DELETE {}", url);
        expect_success(self.http.delete(url).send().await?).await
    }

    async fn update_post(&self, post_id: &str, request: &MessageRequest) -> Result<()> {
        let url = self.endpoint(&["posts", post_id])?;
        debug!("PUT {}", url);
        expect_success(self.http.put(url).json(request).send().await?).await
    }

    async fn delete_post(&self, post_id: &str) -> Result<()> {
        let url = self.endpoint(&["posts", post_id])?;
        debug!("DELETE {}", url);
        expect_success(self.http.delete(url).send().await?).await
    }

    async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>> {
        let url = self.endpoint(&["posts", post_id, "comments"])?;
        debug!("GET {}", url);
        let envelope: ListEnvelope<Comment> = decode(self.http.get(url).send().await?).await?;
        Ok(envelope.into_items())
    }

    async fn create_comment(&self, post_id: &str, request: &MessageRequest) -> Result<()> {
        let url = self.endpoint(&["posts", post_id, "comments"])?;
        debug!("POST {}", url);
        expect_success(self.http.post(url).json(request).send().await?).await
    }

    async fn update_comment(&self, comment_id: &str, request: &MessageRequest) -> Result<()> {
        let url = self.endpoint(&["comments", comment_id])?;
        debug!("PUT {}", url);
        expect_success(self.http.put(url).json(request).send().await?).await
    }

    async fn delete_comment(&self, comment_id: &str) -> Result<()> {
        let url = self.endpoint(&["comments", comment_id])?;
        debug!("DELETE {}", url);
        expect_success(self.http.delete(url).send().await?).await
    }

    async fn list_assignments(&self, class_id: &str) -> Result<Vec<Assignment>> {
        let url = self.endpoint(&["assignments", class_id])?;
        debug!("GET {}", url);
        let envelope: ListEnvelope<Assignment> =
            decode(self.http.get(url).send().await?).await?;
        Ok(envelope.into_items())
    }

    async fn delete_assignment(&self, assignment_id: &str) -> Result<DeleteResponse> {
        let url = self.endpoint(&["delete-assignments", assignment_id])?;
        debug!("DELETE {}", url);
        decode(self.http.delete(url).send().await?).await
    }

    async fn submit_assignment(&self, request: SubmitAssignmentRequest) -> Result<()> {
        let url = self.endpoint(&["submit-assignment"])?;
        let content_type = request.file.content_type();
        let file_name = request.file.file_name.clone();
        debug!(
            "POST {} ({} bytes, {})",
            url,
            request.file.size(),
            content_type
        );

        let part = Part::bytes(request.file.bytes)
            .file_name(file_name)
            .mime_str(content_type)?;
        let form = Form::new()
            .part("file", part)
            .text("assignmentId", request.assignment_id);

        expect_success(self.http.post(url).multipart(form).send().await?).await
    }
}
