//! 确认对话框与提示
//!
//! 所有破坏性操作先经 [`Feedback::confirm`] 确认；每个变更结果都通过
//! [`Feedback::notify`] 给出一条可关闭的提示。

use std::time::Duration;

use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// 一条提示
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub text: String,
    /// 自动关闭时间，None 表示等待用户关闭
    pub timer: Option<Duration>,
}

impl Notice {
    fn new(level: NoticeLevel, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            text: text.into(),
            timer: None,
        }
    }

    pub fn success(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, title, text)
    }

    pub fn warning(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, title, text)
    }

    pub fn error(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, title, text)
    }

    pub fn with_timer(mut self, millis: u64) -> Self {
        self.timer = Some(Duration::from_millis(millis));
        self
    }
}

/// 确认对话框内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub title: String,
    pub text: String,
    pub confirm_label: String,
}

impl Prompt {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            confirm_label: "OK".to_string(),
        }
    }

    pub fn confirm_label(mut self, label: impl Into<String>) -> Self {
        self.confirm_label = label.into();
        self
    }
}

#[async_trait]
pub trait Feedback: Send + Sync {
    /// 返回 false 表示用户取消
    async fn confirm(&self, prompt: &Prompt) -> bool;

    async fn notify(&self, notice: Notice);
}
