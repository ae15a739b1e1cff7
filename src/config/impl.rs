use config::{Config, ConfigError, Environment, File, Map};
use std::sync::OnceLock;

use super::AppConfig;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

impl AppConfig {
    /// 加载配置
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_env(std::env::vars().collect())
    }

    /// 使用给定的环境变量表加载配置
    ///
    /// 环境变量格式为 `CLASSROOM__<SECTION>__<KEY>`，如 `CLASSROOM__CACHE__DEFAULT_TTL`。
    pub fn load_from_env(vars: Map<String, String>) -> Result<Self, ConfigError> {
        let app_env = vars.get("APP_ENV").cloned();

        let builder = Config::builder()
            // 内置默认值，保证没有配置文件时也能启动
            .add_source(Config::try_from(&AppConfig::default())?)
            // 然后加载默认配置文件
            .add_source(File::with_name("config").required(false))
            // 然后根据环境加载特定配置文件
            .add_source(
                File::with_name(&format!(
                    "config.{}",
                    app_env.as_deref().unwrap_or("development")
                ))
                .required(false),
            )
            // 最后加载环境变量覆盖
            .add_source(
                Environment::with_prefix("CLASSROOM")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(vars.clone())),
            )
            // 支持从环境变量加载
            .set_override_option("app.environment", app_env)?
            .set_override_option("app.log_level", vars.get("RUST_LOG").cloned())?
            .set_override_option("backend.base_url", vars.get("BACKEND_URL").cloned())?;

        let config = builder.build()?;
        let mut app_config: AppConfig = config.try_deserialize()?;

        // 统一去掉末尾斜杠，拼接路径时只加一个 "/"
        let trimmed = app_config.backend.base_url.trim_end_matches('/').to_string();
        app_config.backend.base_url = trimmed;

        if app_config.backend.base_url.is_empty() {
            return Err(ConfigError::Message(
                "backend.base_url must not be empty".to_string(),
            ));
        }

        Ok(app_config)
    }

    /// 获取全局配置实例
    pub fn get() -> &'static AppConfig {
        APP_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                eprintln!("Failed to load configuration: {e}");
                std::process::exit(1);
            })
        })
    }

    /// 初始化配置 (在应用启动时调用)
    pub fn init() -> Result<(), ConfigError> {
        let config = Self::load()?;
        APP_CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("Configuration already initialized".to_string()))?;
        Ok(())
    }

    /// 检查是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }
}
