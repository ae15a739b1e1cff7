use serde::Serialize;

/// 公告与评论共用的消息体 `{ message }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageRequest {
    pub message: String,
}

impl MessageRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
