use std::sync::Arc;

use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use super::{CacheResult, QueryKey};
use crate::config::CacheConfig;
use crate::errors::Result;

#[derive(Debug)]
struct CacheEntry {
    raw: String,
    stale: bool,
}

pub struct QueryCache {
    inner: Cache<QueryKey, Arc<CacheEntry>>,
}

impl QueryCache {
    pub fn new(config: &CacheConfig) -> Self {
        let inner = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(std::time::Duration::from_secs(config.default_ttl))
            .build();

        debug!(
            "QueryCache initialized with max capacity: {}, ttl: {}s",
            config.max_capacity, config.default_ttl
        );
        Self { inner }
    }

    /// 读取缓存，区分新鲜、过期与不存在
    pub async fn read<T: DeserializeOwned>(&self, key: &QueryKey) -> Result<CacheResult<T>> {
        let Some(entry) = self.inner.get(key).await else {
            debug!("Key not found in cache: {}", key);
            return Ok(CacheResult::NotFound);
        };

        let value: T = serde_json::from_str(&entry.raw)?;
        if entry.stale {
            debug!("Stale entry for key: {}", key);
            Ok(CacheResult::Stale(value))
        } else {
            debug!("Successfully retrieved key: {}", key);
            Ok(CacheResult::Fresh(value))
        }
    }

    /// 写入查询结果，写入后的条目为新鲜状态
    pub async fn store<T: Serialize>(&self, key: QueryKey, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.inner
            .insert(key, Arc::new(CacheEntry { raw, stale: false }))
            .await;
        Ok(())
    }

    /// 将所有以 `prefix` 开头的条目标记为过期，返回受影响的条目数
    ///
    /// 每个键的过期标记在 `and_compute_with` 中基于当前值完成，
    /// 与并发的 `store` 不会互相覆盖。
    pub async fn invalidate(&self, prefix: &QueryKey) -> usize {
        let keys: Vec<QueryKey> = self
            .inner
            .iter()
            .filter(|(key, _)| prefix.matches(key))
            .map(|(key, _)| (*key).clone())
            .collect();

        let mut count = 0;
        for key in keys {
            let result = self
                .inner
                .entry(key)
                .and_compute_with(|current| async move {
                    match current {
                        Some(entry) if !entry.value().stale => Op::Put(Arc::new(CacheEntry {
                            raw: entry.value().raw.clone(),
                            stale: true,
                        })),
                        _ => Op::Nop,
                    }
                })
                .await;
            if matches!(result, CompResult::ReplacedWith(_)) {
                count += 1;
            }
        }

        debug!("Invalidated {} cache entries under '{}'", count, prefix);
        count
    }

    pub async fn is_stale(&self, key: &QueryKey) -> bool {
        self.inner
            .get(key)
            .await
            .map(|entry| entry.stale)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn cache() -> QueryCache {
        QueryCache::new(&AppConfig::default().cache)
    }

    #[tokio::test]
    async fn test_store_then_read_fresh() {
        let cache = cache();
        let key = QueryKey::comments("p1");
        cache.store(key.clone(), &vec!["a", "b"]).await.unwrap();

        let result: CacheResult<Vec<String>> = cache.read(&key).await.unwrap();
        assert_eq!(result, CacheResult::Fresh(vec!["a".to_string(), "b".to_string()]));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let cache = cache();
        let result: CacheResult<Vec<String>> = cache.read(&QueryKey::classes()).await.unwrap();
        assert_eq!(result, CacheResult::NotFound);
    }

    #[tokio::test]
    async fn test_invalidate_marks_stale_by_prefix() {
        let cache = cache();
        cache.store(QueryKey::comments("p1"), &1u32).await.unwrap();
        cache.store(QueryKey::comments("p2"), &2u32).await.unwrap();
        cache.store(QueryKey::posts(), &3u32).await.unwrap();

        let count = cache.invalidate(&QueryKey::all_comments()).await;
        assert_eq!(count, 2);

        let p1: CacheResult<u32> = cache.read(&QueryKey::comments("p1")).await.unwrap();
        assert_eq!(p1, CacheResult::Stale(1));
        assert!(cache.is_stale(&QueryKey::comments("p2")).await);
        assert!(!cache.is_stale(&QueryKey::posts()).await);

        // 再次失效不会重复计数
        assert_eq!(cache.invalidate(&QueryKey::all_comments()).await, 0);
    }

    #[tokio::test]
    async fn test_store_refreshes_stale_entry() {
        let cache = cache();
        let key = QueryKey::assignments("c1");
        cache.store(key.clone(), &vec![1u32]).await.unwrap();
        cache.invalidate(&key).await;
        cache.store(key.clone(), &vec![1u32, 2]).await.unwrap();

        let result: CacheResult<Vec<u32>> = cache.read(&key).await.unwrap();
        assert!(result.is_fresh());
        assert_eq!(result.fresh(), Some(vec![1, 2]));
    }

    #[tokio::test]
    async fn test_invalidate_keeps_latest_stored_value() {
        let cache = cache();
        let key = QueryKey::comments("p1");
        cache.store(key.clone(), &vec![1u32]).await.unwrap();

        let newer = vec![1u32, 2];
        let all_comments = QueryKey::all_comments();
        let (_, count) = tokio::join!(
            cache.store(key.clone(), &newer),
            cache.invalidate(&all_comments)
        );
        assert!(count <= 1);

        // 无论先后，最终值都是最新写入的数据
        let result: CacheResult<Vec<u32>> = cache.read(&key).await.unwrap();
        match result {
            CacheResult::Fresh(v) | CacheResult::Stale(v) => assert_eq!(v, newer),
            CacheResult::NotFound => panic!("entry vanished"),
        }

        cache.invalidate(&QueryKey::all_comments()).await;
        let result: CacheResult<Vec<u32>> = cache.read(&key).await.unwrap();
        assert_eq!(result, CacheResult::Stale(newer));
    }
}
