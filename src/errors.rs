//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_classroom_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum ClassroomError {
            $($variant(String),)*
        }

        impl ClassroomError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(ClassroomError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(ClassroomError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(ClassroomError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl ClassroomError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        ClassroomError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_classroom_errors! {
    Config("E001", "Configuration Error"),
    Network("E002", "Network Error"),
    Http("E003", "HTTP Error"),
    Server("E004", "Server Error"),
    Rejected("E005", "Request Rejected"),
    Validation("E006", "Validation Error"),
    NotFound("E007", "Resource Not Found"),
    Serialization("E008", "Serialization Error"),
    FileOperation("E009", "File Operation Error"),
    Busy("E010", "Operation In Progress"),
}

impl ClassroomError {
    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 服务端返回的错误信息
    ///
    /// 只有 `Server` 与 `Rejected` 携带后端给出的 message，其余错误返回 None。
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClassroomError::Server(msg) | ClassroomError::Rejected(msg) if !msg.trim().is_empty() => {
                Some(msg)
            }
            _ => None,
        }
    }

    /// 面向用户的提示文本：优先使用服务端信息，否则使用调用方给出的兜底文本
    pub fn user_message<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.server_message().unwrap_or(fallback)
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ClassroomError::Validation(_))
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, ClassroomError::Busy(_))
    }
}

impl fmt::Display for ClassroomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ClassroomError {}

// 为常见的错误类型实现 From trait
impl From<reqwest::Error> for ClassroomError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClassroomError::Serialization(err.to_string())
        } else {
            ClassroomError::Network(err.to_string())
        }
    }
}

impl From<std::io::Error> for ClassroomError {
    fn from(err: std::io::Error) -> Self {
        ClassroomError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for ClassroomError {
    fn from(err: serde_json::Error) -> Self {
        ClassroomError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for ClassroomError {
    fn from(err: config::ConfigError) -> Self {
        ClassroomError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClassroomError>;
