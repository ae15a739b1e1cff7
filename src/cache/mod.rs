//! 查询缓存
//!
//! 以 [`QueryKey`] 为地址的显式缓存对象，由组合根持有。
//! 变更成功后只做失效（标记过期），从不直接写入变更结果；
//! 过期条目在下一次读取时触发重新拉取。

pub mod query_cache;

use std::fmt;

pub use query_cache::QueryCache;

/// 缓存读取结果
#[derive(Debug, Clone, PartialEq)]
pub enum CacheResult<T> {
    Fresh(T),
    Stale(T),
    NotFound,
}

impl<T> CacheResult<T> {
    pub fn is_fresh(&self) -> bool {
        matches!(self, CacheResult::Fresh(_))
    }

    /// 仅在新鲜时返回数据
    pub fn fresh(self) -> Option<T> {
        match self {
            CacheResult::Fresh(value) => Some(value),
            _ => None,
        }
    }
}

/// 分段的查询键，如 `["comments", "<postId>"]`
///
/// 失效按前缀匹配：`comments` 会同时失效所有公告下的评论。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn classes() -> Self {
        Self::new(["classes"])
    }

    pub fn posts() -> Self {
        Self::new(["posts"])
    }

    /// 所有公告的评论
    pub fn all_comments() -> Self {
        Self::new(["comments"])
    }

    pub fn comments(post_id: &str) -> Self {
        Self::new(["comments", post_id])
    }

    pub fn assignments(class_id: &str) -> Self {
        Self::new(["assignments", class_id])
    }

    /// `self` 是否为 `other` 的前缀（包括相等）
    pub fn matches(&self, other: &QueryKey) -> bool {
        other.0.len() >= self.0.len() && other.0[..self.0.len()] == self.0[..]
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}
