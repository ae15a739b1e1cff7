use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, error};

use crate::api::ClassroomApi;
use crate::cache::{CacheResult, QueryCache, QueryKey};
use crate::errors::{ClassroomError, Result};
use crate::runtime::ClientContext;

/// 一个查询的定义：缓存键与拉取方式
#[async_trait]
pub trait QueryDef: Send + Sync + 'static {
    type Data: Serialize + DeserializeOwned + Clone + Default + Send + Sync;

    const NAME: &'static str;

    fn key(&self) -> QueryKey;

    /// 返回 false 时查询被禁用，不会访问网络
    fn enabled(&self) -> bool {
        true
    }

    /// 首次拉取前即可展示的数据，None 表示在拉取完成前处于 pending
    fn initial_data(&self) -> Option<Self::Data> {
        None
    }

    async fn fetch(&self, api: &dyn ClassroomApi) -> Result<Self::Data>;
}

struct QueryState<T> {
    data: Option<T>,
    is_fetching: bool,
    error: Option<ClassroomError>,
}

/// 查询钩子实例
pub struct UseQuery<Q: QueryDef> {
    def: Q,
    api: Arc<dyn ClassroomApi>,
    cache: Arc<QueryCache>,
    state: Mutex<QueryState<Q::Data>>,
}

impl<Q: QueryDef> UseQuery<Q> {
    pub fn new(ctx: &ClientContext, def: Q) -> Self {
        let data = def.initial_data();
        Self {
            def,
            api: ctx.api.clone(),
            cache: ctx.cache.clone(),
            state: Mutex::new(QueryState {
                data,
                is_fetching: false,
                error: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueryState<Q::Data>> {
        self.state.lock().expect("Query state lock poisoned")
    }

    pub fn key(&self) -> QueryKey {
        self.def.key()
    }

    /// 当前数据，尚无数据时为默认值
    pub fn data(&self) -> Q::Data {
        self.lock().data.clone().unwrap_or_default()
    }

    /// 还没有任何可展示的数据，且尚未失败
    pub fn is_pending(&self) -> bool {
        let state = self.lock();
        state.data.is_none() && state.error.is_none() && self.def.enabled()
    }

    pub fn is_fetching(&self) -> bool {
        self.lock().is_fetching
    }

    pub fn error(&self) -> Option<ClassroomError> {
        self.lock().error.clone()
    }

    /// 读穿缓存：缓存新鲜时不访问网络，过期或缺失时重新拉取
    pub async fn fetch(&self) -> Result<Q::Data> {
        if !self.def.enabled() {
            return Ok(self.data());
        }

        let key = self.def.key();
        match self.cache.read::<Q::Data>(&key).await {
            Ok(CacheResult::Fresh(data)) => {
                debug!(query = Q::NAME, key = %key, "Served from cache");
                self.lock().data = Some(data.clone());
                return Ok(data);
            }
            Ok(_) => {}
            Err(e) => {
                debug!(query = Q::NAME, key = %key, error = %e, "Unreadable cache entry, refetching");
            }
        }

        self.refetch().await
    }

    /// 总是访问网络，成功后写入缓存
    pub async fn refetch(&self) -> Result<Q::Data> {
        if !self.def.enabled() {
            return Ok(self.data());
        }

        self.lock().is_fetching = true;
        let key = self.def.key();
        debug!(query = Q::NAME, key = %key, "Fetching");
        let result = self.def.fetch(self.api.as_ref()).await;

        if let Ok(data) = &result
            && let Err(e) = self.cache.store(key.clone(), data).await
        {
            error!(query = Q::NAME, key = %key, error = %e, "Failed to store query result");
        }

        let mut state = self.lock();
        state.is_fetching = false;
        match &result {
            Ok(data) => {
                state.data = Some(data.clone());
                state.error = None;
            }
            Err(e) => {
                error!(query = Q::NAME, key = %key, error = %e, "Query failed");
                state.error = Some(e.clone());
            }
        }
        drop(state);

        result
    }
}
