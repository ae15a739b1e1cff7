use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::{ClassroomApi, HttpClassroomApi};
use crate::cache::QueryCache;
use crate::components::feedback::Feedback;
use crate::config::{AppConfig, UploadConfig};
use crate::errors::Result;

/// 组合根：所有组件共享的接口、缓存与反馈通道
///
/// 查询缓存只在这里创建，不存在全局缓存。
#[derive(Clone)]
pub struct ClientContext {
    pub api: Arc<dyn ClassroomApi>,
    pub cache: Arc<QueryCache>,
    pub feedback: Arc<dyn Feedback>,
    pub upload: UploadConfig,
}

impl ClientContext {
    pub fn new(
        config: &AppConfig,
        api: Arc<dyn ClassroomApi>,
        feedback: Arc<dyn Feedback>,
    ) -> Self {
        Self {
            api,
            cache: Arc::new(QueryCache::new(&config.cache)),
            feedback,
            upload: config.upload.clone(),
        }
    }
}

/// 创建 HTTP 客户端并组装上下文
pub fn prepare_client_startup(
    config: &AppConfig,
    feedback: Arc<dyn Feedback>,
) -> Result<ClientContext> {
    warn!("Using backend at {}", config.backend.base_url);
    if !config.backend.with_credentials {
        warn!("Session cookies are disabled; authenticated endpoints will be rejected");
    }

    let api = HttpClassroomApi::new(&config.backend)?;
    let context = ClientContext::new(config, Arc::new(api), feedback);

    debug!(
        "Client context ready (cache capacity: {}, ttl: {}s)",
        config.cache.max_capacity, config.cache.default_ttl
    );
    Ok(context)
}
