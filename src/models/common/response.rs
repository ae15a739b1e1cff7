use serde::{Deserialize, Serialize};

// 列表接口的统一包装 `{ data: [...] }`
//
// 后端偶尔直接返回裸数组，两种形式都接受；`data` 缺失或为 null 视为空列表。
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged, bound(deserialize = "T: Deserialize<'de>"))]
pub enum ListEnvelope<T> {
    Wrapped {
        #[serde(default)]
        data: Option<Vec<T>>,
    },
    Bare(Vec<T>),
}

impl<T> ListEnvelope<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            ListEnvelope::Wrapped { data } => data.unwrap_or_default(),
            ListEnvelope::Bare(items) => items,
        }
    }
}

// 删除类接口返回 `{ success, message? }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DeleteResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn refused(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

// 非 2xx 响应体，只关心 message 字段
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
