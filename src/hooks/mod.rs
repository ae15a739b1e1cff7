//! 数据钩子层
//!
//! 每个钩子封装一个后端接口，对外统一暴露 `mutate`/`data`、`is_pending`、
//! `error`、`is_success`，并声明成功后需要失效的查询键。
//! 组件在成功后自行 `refetch`，钩子本身不重试、不回滚。

pub mod assignments;
pub mod classes;
pub mod comments;
mod mutation;
pub mod posts;
mod query;

pub use mutation::{MutationDef, MutationState, UseMutation};
pub use query::{QueryDef, UseQuery};
