//! Classroom 客户端
//!
//! 班级、公告、评论、作业与提交的 REST 客户端，附带查询缓存与视图模型。
//!
//! # 架构
//! - `api`: 后端接口（reqwest）
//! - `cache`: 查询缓存（Moka）
//! - `components`: 视图模型（卡片、列表、编辑状态机）
//! - `config`: 配置管理
//! - `errors`: 统一错误处理
//! - `hooks`: 查询与变更钩子，负责缓存失效
//! - `models`: 数据模型定义
//! - `runtime`: 上下文组装与终端反馈
//! - `utils`: 校验工具函数

pub mod api;
pub mod cache;
pub mod components;
pub mod config;
pub mod errors;
pub mod hooks;
pub mod models;
pub mod runtime;
pub mod utils;

#[cfg(test)]
mod testing;
