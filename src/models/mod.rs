pub mod assignments;
pub mod classes;
pub mod comments;
pub mod common;
pub mod posts;
pub mod submissions;

pub use common::response::{DeleteResponse, ErrorBody, ListEnvelope};

/// 拥有后端 `_id` 的实体
pub trait Identified {
    fn id(&self) -> &str;
}
