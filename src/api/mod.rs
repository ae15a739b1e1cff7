//! 后端接口层
//!
//! [`ClassroomApi`] 描述客户端用到的全部 REST 接口；
//! 响应在这一层被解码为明确的 `Result` 类型，上层不再接触原始 JSON。

pub mod http;

use async_trait::async_trait;

pub use http::HttpClassroomApi;

use crate::errors::Result;
use crate::models::{
    DeleteResponse, assignments::entities::Assignment, comments::entities::Comment,
    posts::requests::MessageRequest, submissions::requests::SubmitAssignmentRequest,
};

#[async_trait]
pub trait ClassroomApi: Send + Sync {
    /// 班级
    // 删除班级
    async fn delete_class(&self, class_id: &str) -> Result<()>;

    /// 公告
    // 更新公告内容
    async fn update_post(&self, post_id: &str, request: &MessageRequest) -> Result<()>;
    // 删除公告
    async fn delete_post(&self, post_id: &str) -> Result<()>;

    /// 评论
    // 列出公告下的评论
    async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>>;
    // 发表评论
    async fn create_comment(&self, post_id: &str, request: &MessageRequest) -> Result<()>;
    // 更新评论
    async fn update_comment(&self, comment_id: &str, request: &MessageRequest) -> Result<()>;
    // 删除评论
    async fn delete_comment(&self, comment_id: &str) -> Result<()>;

    /// 作业
    // 列出班级作业
    async fn list_assignments(&self, class_id: &str) -> Result<Vec<Assignment>>;
    // 删除作业，后端以 `{ success, message }` 表示结果
    async fn delete_assignment(&self, assignment_id: &str) -> Result<DeleteResponse>;
    // 提交作业文件
    async fn submit_assignment(&self, request: SubmitAssignmentRequest) -> Result<()>;
}
