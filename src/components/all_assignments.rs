use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, error};

use super::{
    ActionOutcome, AssignmentCard, Notice, PendingOp, Prompt, ViewAction, ViewState,
    failure_notice,
};
use crate::errors::Result;
use crate::hooks::assignments::{
    DeleteAssignment, DeleteAssignmentArgs, GetAssignments, UseDeleteAssignment,
    UseGetAssignments,
};
use crate::hooks::{UseMutation, UseQuery};
use crate::models::assignments::entities::Assignment;
use crate::runtime::ClientContext;

/// 班级作业列表
///
/// 拉取结果镜像到本地 [`ViewState`]；删除成功后直接按 id 移除，不重新拉取。
/// 任一删除进行中时，所有删除按钮都被禁用。
pub struct AllAssignments {
    ctx: ClientContext,
    class_id: String,
    query: UseGetAssignments,
    delete: UseDeleteAssignment,
    view: Mutex<ViewState<Assignment>>,
    cards: Mutex<HashMap<String, Arc<AssignmentCard>>>,
}

impl AllAssignments {
    pub fn new(ctx: &ClientContext, class_id: impl Into<String>) -> Self {
        let class_id = class_id.into();
        Self {
            ctx: ctx.clone(),
            query: UseQuery::new(
                ctx,
                GetAssignments {
                    class_id: class_id.clone(),
                },
            ),
            delete: UseMutation::new(ctx, DeleteAssignment),
            class_id,
            view: Mutex::new(ViewState::default()),
            cards: Mutex::new(HashMap::new()),
        }
    }

    fn view(&self) -> MutexGuard<'_, ViewState<Assignment>> {
        self.view.lock().expect("Assignment view lock poisoned")
    }

    fn cards(&self) -> MutexGuard<'_, HashMap<String, Arc<AssignmentCard>>> {
        self.cards.lock().expect("Assignment cards lock poisoned")
    }

    /// 挂载时拉取作业列表
    pub async fn load(&self) -> Result<()> {
        let items = self.query.fetch().await?;
        debug!(class_id = %self.class_id, count = items.len(), "Assignments loaded");

        {
            let mut cards = self.cards();
            cards.retain(|id, _| items.iter().any(|a| &a.id == id));
            for item in &items {
                cards
                    .entry(item.id.clone())
                    .or_insert_with(|| Arc::new(AssignmentCard::new(&self.ctx, item.clone())));
            }
        }
        self.view().apply(ViewAction::Synced(items))
    }

    pub fn is_pending(&self) -> bool {
        self.query.is_pending()
    }

    pub fn is_deleting(&self) -> bool {
        self.view().is_busy()
    }

    pub fn items(&self) -> Vec<Assignment> {
        self.view().items().to_vec()
    }

    /// 单个作业卡片，用于提交操作
    pub fn card(&self, assignment_id: &str) -> Option<Arc<AssignmentCard>> {
        self.cards().get(assignment_id).cloned()
    }

    pub async fn delete(&self, assignment_id: &str) -> ActionOutcome {
        // 删除锁被占用时直接拒绝，不弹确认框
        if self.is_deleting() {
            return ActionOutcome::Disabled;
        }
        if !self.view().contains(assignment_id) {
            return ActionOutcome::Invalid(format!("Assignment {assignment_id} is not listed"));
        }

        let prompt = Prompt::new("Delete Assignment?", "This cannot be undone.")
            .confirm_label("Yes, delete");
        if !self.ctx.feedback.confirm(&prompt).await {
            return ActionOutcome::Declined;
        }

        if self
            .view()
            .apply(ViewAction::Begin(PendingOp::delete(assignment_id)))
            .is_err()
        {
            return ActionOutcome::Disabled;
        }

        let args = DeleteAssignmentArgs {
            class_id: self.class_id.clone(),
            assignment_id: assignment_id.to_string(),
        };
        match self.delete.mutate(args).await {
            Ok(()) => {
                self.settle(ViewAction::Removed(assignment_id.to_string()));
                self.cards().remove(assignment_id);
                self.ctx
                    .feedback
                    .notify(
                        Notice::success("Deleted!", "Assignment deleted successfully.")
                            .with_timer(1500),
                    )
                    .await;
                ActionOutcome::Done
            }
            Err(e) => {
                self.settle(ViewAction::Settled);
                if e.is_busy() {
                    return ActionOutcome::Disabled;
                }
                self.ctx
                    .feedback
                    .notify(failure_notice(&e, "Failed to delete assignment"))
                    .await;
                ActionOutcome::Failed(e)
            }
        }
    }

    // Removed 与 Settled 总是成功
    fn settle(&self, action: ViewAction<Assignment>) {
        if let Err(e) = self.view().apply(action) {
            error!(error = %e, "Failed to settle assignment view");
        }
    }

    pub fn render(&self) -> String {
        self.render_at(Utc::now())
    }

    pub fn render_at(&self, now: DateTime<Utc>) -> String {
        if self.is_pending() {
            return "Loading assignments...\n".to_string();
        }

        // 首次拉取失败且没有数据时显示错误，而不是一直停在加载中
        if let Some(err) = self.query.error()
            && self.view().is_empty()
        {
            return format!(
                "{}\n",
                err.user_message("Failed to load assignments")
            );
        }

        let (items, deleting) = {
            let view = self.view();
            (
                view.items().to_vec(),
                view.pending_op().map(|op| op.target.clone()),
            )
        };
        if items.is_empty() {
            return "No assignments yet\nAssignments will appear here\n".to_string();
        }

        let cards = self.cards();
        let mut out = String::new();
        for item in &items {
            match cards.get(&item.id) {
                Some(card) => out.push_str(&card.render_at(now)),
                None => out.push_str(&format!("  {}\n", item.title)),
            }
            let action = match &deleting {
                Some(target) if *target == item.id => "[Deleting...]",
                Some(_) => "[Delete (disabled)]",
                None => "[Delete]",
            };
            out.push_str(&format!("  {action}\n"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::components::NoticeLevel;
    use crate::errors::ClassroomError;
    use crate::models::DeleteResponse;
    use crate::testing::{MockApi, ScriptedFeedback, assignment, context, fixed_now};

    fn seeded_api() -> Arc<MockApi> {
        let api = MockApi::new();
        api.seed_assignments(vec![
            assignment("a1", "c1", "Essay", fixed_now() - Duration::days(1)),
            assignment("a2", "c1", "Quiz", fixed_now() + Duration::days(4)),
            assignment("a3", "c2", "Other class", fixed_now()),
        ]);
        api
    }

    #[tokio::test]
    async fn test_overdue_then_deleted_shows_placeholder() {
        let api = MockApi::new();
        api.seed_assignments(vec![assignment(
            "a1",
            "c1",
            "Essay",
            fixed_now() - Duration::days(1),
        )]);
        let feedback = ScriptedFeedback::confirming();
        let list = AllAssignments::new(&context(&api, &feedback), "c1");

        assert_eq!(list.render_at(fixed_now()), "Loading assignments...\n");
        list.load().await.unwrap();
        assert!(list.render_at(fixed_now()).contains("OVERDUE"));

        assert!(list.delete("a1").await.is_done());
        assert!(list.render_at(fixed_now()).starts_with("No assignments yet"));
        assert!(list.card("a1").is_none());

        let notices = feedback.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].title, "Deleted!");
        // 删除后不重新拉取集合
        assert_eq!(
            api.calls(),
            vec!["GET /assignments/c1", "DELETE /delete-assignments/a1"]
        );
    }

    #[tokio::test]
    async fn test_declined_delete_keeps_item() {
        let api = seeded_api();
        let feedback = ScriptedFeedback::declining();
        let list = AllAssignments::new(&context(&api, &feedback), "c1");
        list.load().await.unwrap();

        assert_eq!(list.delete("a1").await, ActionOutcome::Declined);
        assert_eq!(list.items().len(), 2);
        assert_eq!(feedback.prompts()[0].confirm_label, "Yes, delete");
        assert!(feedback.notices().is_empty());
    }

    #[tokio::test]
    async fn test_refused_delete_shows_server_message() {
        let api = seeded_api();
        api.respond_delete_assignment(DeleteResponse::refused("Assignment has submissions"));
        let feedback = ScriptedFeedback::confirming();
        let list = AllAssignments::new(&context(&api, &feedback), "c1");
        list.load().await.unwrap();

        assert!(matches!(list.delete("a1").await, ActionOutcome::Failed(_)));
        assert_eq!(list.items().len(), 2);
        assert!(!list.is_deleting());

        let notices = feedback.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert_eq!(notices[0].text, "Assignment has submissions");
    }

    #[tokio::test]
    async fn test_network_failure_uses_fallback() {
        let api = seeded_api();
        api.fail("delete_assignment", ClassroomError::http("HTTP 502"));
        let feedback = ScriptedFeedback::confirming();
        let list = AllAssignments::new(&context(&api, &feedback), "c1");
        list.load().await.unwrap();

        list.delete("a2").await;
        assert_eq!(feedback.notices()[0].text, "Failed to delete assignment");
        assert!(list.items().iter().any(|a| a.id == "a2"));
    }

    #[tokio::test]
    async fn test_delete_refused_while_locked() {
        let api = seeded_api();
        let feedback = ScriptedFeedback::confirming();
        let list = AllAssignments::new(&context(&api, &feedback), "c1");
        list.load().await.unwrap();
        let gate = api.hold();

        let (first, during) = tokio::join!(list.delete("a1"), async {
            api.wait_for_calls(2).await;
            let during = (
                list.is_deleting(),
                list.delete("a2").await,
                list.render_at(fixed_now()),
            );
            gate.notify_one();
            during
        });

        assert!(first.is_done());
        assert!(during.0);
        assert_eq!(during.1, ActionOutcome::Disabled);
        assert!(during.2.contains("[Deleting...]"));
        assert!(during.2.contains("[Delete (disabled)]"));
        // 第二次删除没有弹出确认框
        assert_eq!(feedback.prompts().len(), 1);
        assert_eq!(list.items().len(), 1);
    }

    #[tokio::test]
    async fn test_load_only_lists_own_class() {
        let api = seeded_api();
        let feedback = ScriptedFeedback::confirming();
        let list = AllAssignments::new(&context(&api, &feedback), "c1");
        list.load().await.unwrap();

        let ids: Vec<String> = list.items().into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["a1", "a2"]);
        assert!(list.card("a2").is_some());
        assert!(list.card("a3").is_none());
    }

    #[tokio::test]
    async fn test_failed_load_renders_error_instead_of_loading() {
        let api = MockApi::new();
        api.fail("list_assignments", ClassroomError::network("offline"));
        let feedback = ScriptedFeedback::confirming();
        let list = AllAssignments::new(&context(&api, &feedback), "c1");

        assert!(list.load().await.is_err());
        assert!(!list.is_pending());
        assert_eq!(list.render_at(fixed_now()), "Failed to load assignments\n");
    }
}
