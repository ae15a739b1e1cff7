use serde::{Deserialize, Serialize};

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub backend: BackendConfig,
    pub cache: CacheConfig,
    pub upload: UploadConfig,
}

/// 应用设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub environment: String,
    pub log_level: String,
}

/// 后端服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,       // 后端根地址，不带末尾斜杠
    pub with_credentials: bool, // 是否保存并携带会话 Cookie
    pub user_agent: String,
}

/// 查询缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub default_ttl: u64, // 秒
    pub max_capacity: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_size: usize,            // 单文件最大字节数
    pub allowed_types: Vec<String>, // 允许的扩展名
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSettings {
                environment: "development".to_string(),
                log_level: "info".to_string(),
            },
            backend: BackendConfig {
                base_url: "http://localhost:5000".to_string(),
                with_credentials: true,
                user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            },
            cache: CacheConfig {
                default_ttl: 300,
                max_capacity: 1024,
            },
            upload: UploadConfig {
                max_size: 10 * 1024 * 1024,
                allowed_types: [".pdf", ".doc", ".docx", ".txt", ".zip"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            },
        }
    }
}
