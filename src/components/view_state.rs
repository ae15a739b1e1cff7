//! 列表视图状态
//!
//! 远端集合在本地的镜像，只能通过 [`ViewAction`] 变换，
//! 用来在成功响应后立即移除条目，而不必重新拉取整个集合。

use crate::errors::{ClassroomError, Result};
use crate::models::Identified;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Delete,
}

/// 正在进行中的操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOp {
    pub kind: OpKind,
    pub target: String,
}

impl PendingOp {
    pub fn delete(target: impl Into<String>) -> Self {
        Self {
            kind: OpKind::Delete,
            target: target.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ViewAction<T> {
    /// 用远端数据整体替换
    Synced(Vec<T>),
    /// 开始一个操作；已有操作进行中时被拒绝
    Begin(PendingOp),
    /// 操作成功，按 id 移除条目并结束操作
    Removed(String),
    /// 操作结束，条目保持不变
    Settled,
}

#[derive(Debug, Clone)]
pub struct ViewState<T> {
    items: Vec<T>,
    pending_op: Option<PendingOp>,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            pending_op: None,
        }
    }
}

impl<T: Identified> ViewState<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            pending_op: None,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id() == id)
    }

    pub fn pending_op(&self) -> Option<&PendingOp> {
        self.pending_op.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.pending_op.is_some()
    }

    pub fn apply(&mut self, action: ViewAction<T>) -> Result<()> {
        match action {
            ViewAction::Synced(items) => {
                self.items = items;
            }
            ViewAction::Begin(op) => {
                if let Some(current) = &self.pending_op {
                    return Err(ClassroomError::busy(format!(
                        "{:?} of '{}' is still in progress",
                        current.kind, current.target
                    )));
                }
                self.pending_op = Some(op);
            }
            ViewAction::Removed(id) => {
                self.items.retain(|item| item.id() != id);
                self.pending_op = None;
            }
            ViewAction::Settled => {
                self.pending_op = None;
            }
        }
        Ok(())
    }
}
