//! 视图模型层
//!
//! 卡片与列表组件持有本地界面状态，响应用户操作调用钩子，
//! 并把结果转换为确认框与提示。所有方法接收 `&self`，状态锁从不跨越 `.await`，
//! 因此请求进行中仍可接收其他操作，由各自的 pending 标志决定是否放行。

pub mod all_assignments;
pub mod assignment_card;
pub mod class_card;
pub mod edit;
pub mod feedback;
pub mod post_card;
pub mod view_state;

pub use all_assignments::AllAssignments;
pub use assignment_card::{AssignmentCard, SubmissionPhase};
pub use class_card::ClassCard;
pub use edit::{EditBuffer, EditPhase};
pub use feedback::{Feedback, Notice, NoticeLevel, Prompt};
pub use post_card::PostCard;
pub use view_state::{OpKind, PendingOp, ViewAction, ViewState};

use crate::errors::ClassroomError;

/// 一次用户操作的结果
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// 操作完成（请求成功）
    Done,
    /// 用户在确认框中取消，无任何副作用
    Declined,
    /// 本地校验未通过，未发请求
    Invalid(String),
    /// 控件处于禁用状态（已有请求进行中），未发请求
    Disabled,
    /// 请求失败，本地状态保持不变
    Failed(ClassroomError),
}

impl ActionOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, ActionOutcome::Done)
    }
}

/// 失败提示：优先展示服务端信息
pub(crate) fn failure_notice(err: &ClassroomError, fallback: &str) -> Notice {
    Notice::error("Error!", err.user_message(fallback))
}
