//! 测试辅助：内存后端、脚本化反馈与数据构造

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::Notify;

use crate::api::ClassroomApi;
use crate::components::{Feedback, Notice, Prompt};
use crate::config::AppConfig;
use crate::errors::{ClassroomError, Result};
use crate::models::{
    DeleteResponse, assignments::entities::Assignment, classes::entities::Class,
    comments::entities::Comment, posts::entities::Post, posts::requests::MessageRequest,
    submissions::requests::SubmitAssignmentRequest,
};
use crate::runtime::ClientContext;

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap()
}

/// 内存后端，记录每次调用
///
/// 调用在等待闸门之前记录，测试可借此观察请求进行中的状态。
#[derive(Default)]
pub struct MockApi {
    calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<String, ClassroomError>>,
    comments: Mutex<Vec<Comment>>,
    assignments: Mutex<Vec<Assignment>>,
    delete_response: Mutex<Option<DeleteResponse>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// 让某个操作此后一直失败
    pub fn fail(&self, op: &str, err: ClassroomError) {
        self.failures.lock().unwrap().insert(op.to_string(), err);
    }

    pub fn seed_comments(&self, comments: Vec<Comment>) {
        *self.comments.lock().unwrap() = comments;
    }

    pub fn seed_assignments(&self, assignments: Vec<Assignment>) {
        *self.assignments.lock().unwrap() = assignments;
    }

    /// 覆盖删除作业的响应体（不会实际删除）
    pub fn respond_delete_assignment(&self, response: DeleteResponse) {
        *self.delete_response.lock().unwrap() = Some(response);
    }

    /// 此后每个请求都要等闸门放行一次
    pub fn hold(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub async fn wait_for_calls(&self, count: usize) {
        while self.calls.lock().unwrap().len() < count {
            tokio::task::yield_now().await;
        }
    }

    async fn enter(&self, op: &str, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        match self.failures.lock().unwrap().get(op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ClassroomApi for MockApi {
    async fn delete_class(&self, class_id: &str) -> Result<()> {
        self.enter("delete_class", format!("DELETE /class/{class_id}"))
            .await
    }

    async fn update_post(&self, post_id: &str, request: &MessageRequest) -> Result<()> {
        self.enter(
            "update_post",
            format!("PUT /posts/{post_id} {}", request.message),
        )
        .await
    }

    async fn delete_post(&self, post_id: &str) -> Result<()> {
        self.enter("delete_post", format!("DELETE /posts/{post_id}"))
            .await
    }

    async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>> {
        self.enter("list_comments", format!("GET /posts/{post_id}/comments"))
            .await?;
        Ok(self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn create_comment(&self, post_id: &str, request: &MessageRequest) -> Result<()> {
        self.enter(
            "create_comment",
            format!("POST /posts/{post_id}/comments {}", request.message),
        )
        .await?;
        let mut comments = self.comments.lock().unwrap();
        let id = format!("c{}", comments.len() + 1);
        comments.push(comment(&id, post_id, &request.message));
        Ok(())
    }

    async fn update_comment(&self, comment_id: &str, request: &MessageRequest) -> Result<()> {
        self.enter(
            "update_comment",
            format!("PUT /comments/{comment_id} {}", request.message),
        )
        .await?;
        if let Some(c) = self
            .comments
            .lock()
            .unwrap()
            .iter_mut()
            .find(|c| c.id == comment_id)
        {
            c.message = request.message.clone();
        }
        Ok(())
    }

    async fn delete_comment(&self, comment_id: &str) -> Result<()> {
        self.enter("delete_comment", format!("DELETE /comments/{comment_id}"))
            .await?;
        self.comments.lock().unwrap().retain(|c| c.id != comment_id);
        Ok(())
    }

    async fn list_assignments(&self, class_id: &str) -> Result<Vec<Assignment>> {
        self.enter("list_assignments", format!("GET /assignments/{class_id}"))
            .await?;
        Ok(self
            .assignments
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.class_id == class_id)
            .cloned()
            .collect())
    }

    async fn delete_assignment(&self, assignment_id: &str) -> Result<DeleteResponse> {
        self.enter(
            "delete_assignment",
            format!("DELETE /delete-assignments/{assignment_id}"),
        )
        .await?;
        if let Some(response) = self.delete_response.lock().unwrap().clone() {
            return Ok(response);
        }
        self.assignments
            .lock()
            .unwrap()
            .retain(|a| a.id != assignment_id);
        Ok(DeleteResponse::ok())
    }

    async fn submit_assignment(&self, request: SubmitAssignmentRequest) -> Result<()> {
        self.enter(
            "submit_assignment",
            format!(
                "POST /submit-assignment {} {}",
                request.assignment_id, request.file.file_name
            ),
        )
        .await
    }
}

/// 按预设答案回应确认框，并记录所有提示
pub struct ScriptedFeedback {
    answers: Mutex<VecDeque<bool>>,
    default_answer: bool,
    prompts: Mutex<Vec<Prompt>>,
    notices: Mutex<Vec<Notice>>,
}

impl ScriptedFeedback {
    fn build(answers: VecDeque<bool>, default_answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers),
            default_answer,
            prompts: Mutex::new(Vec::new()),
            notices: Mutex::new(Vec::new()),
        })
    }

    pub fn confirming() -> Arc<Self> {
        Self::build(VecDeque::new(), true)
    }

    pub fn declining() -> Arc<Self> {
        Self::build(VecDeque::new(), false)
    }

    /// 依次使用给定答案，用完后一律取消
    pub fn with_answers(answers: impl IntoIterator<Item = bool>) -> Arc<Self> {
        Self::build(answers.into_iter().collect(), false)
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

#[async_trait]
impl Feedback for ScriptedFeedback {
    async fn confirm(&self, prompt: &Prompt) -> bool {
        self.prompts.lock().unwrap().push(prompt.clone());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.default_answer)
    }

    async fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

pub fn context(api: &Arc<MockApi>, feedback: &Arc<ScriptedFeedback>) -> ClientContext {
    ClientContext::new(&AppConfig::default(), api.clone(), feedback.clone())
}

/// 班级代码取名称前三个字母，如 ("c1", "Physics") -> "PHY-c1"
pub fn class(id: &str, name: &str) -> Class {
    let prefix: String = name.chars().take(3).collect::<String>().to_uppercase();
    Class {
        id: id.to_string(),
        name: name.to_string(),
        teacher: "Ms. Rivera".to_string(),
        description: format!("{name} for second-year students"),
        code: format!("{prefix}-{id}"),
    }
}

pub fn post(id: &str, message: &str) -> Post {
    Post {
        id: id.to_string(),
        class_id: "c1".to_string(),
        message: message.to_string(),
        time: fixed_now(),
    }
}

pub fn comment(id: &str, post_id: &str, message: &str) -> Comment {
    Comment {
        id: id.to_string(),
        post_id: post_id.to_string(),
        user_name: "Demo User".to_string(),
        message: message.to_string(),
        time: fixed_now(),
    }
}

pub fn assignment(id: &str, class_id: &str, title: &str, due_date: DateTime<Utc>) -> Assignment {
    Assignment {
        id: id.to_string(),
        class_id: class_id.to_string(),
        title: title.to_string(),
        description: String::new(),
        due_date,
    }
}
