use std::sync::{Mutex, MutexGuard};

use tracing::warn;

use super::{ActionOutcome, Notice, Prompt, failure_notice};
use crate::hooks::classes::{DeleteClass, UseDeleteClass};
use crate::hooks::UseMutation;
use crate::models::classes::entities::Class;
use crate::runtime::ClientContext;

type DeletedCallback = Box<dyn Fn(&str) + Send + Sync>;

struct ClassCardState {
    class: Class,
    menu_open: bool,
}

/// 班级卡片：展示班级信息，菜单中提供删除
pub struct ClassCard {
    ctx: ClientContext,
    delete: UseDeleteClass,
    on_deleted: Option<DeletedCallback>,
    state: Mutex<ClassCardState>,
}

impl ClassCard {
    pub fn new(ctx: &ClientContext, class: Class) -> Self {
        Self {
            ctx: ctx.clone(),
            delete: UseMutation::new(ctx, DeleteClass),
            on_deleted: None,
            state: Mutex::new(ClassCardState {
                class,
                menu_open: false,
            }),
        }
    }

    /// 删除成功后通知父级列表移除该班级
    pub fn on_deleted(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_deleted = Some(Box::new(callback));
        self
    }

    fn lock(&self) -> MutexGuard<'_, ClassCardState> {
        self.state.lock().expect("Class card state lock poisoned")
    }

    pub fn class(&self) -> Class {
        self.lock().class.clone()
    }

    pub fn is_menu_open(&self) -> bool {
        self.lock().menu_open
    }

    pub fn is_deleting(&self) -> bool {
        self.delete.is_pending()
    }

    /// 删除进行中菜单按钮被禁用
    pub fn toggle_menu(&self) {
        if self.is_deleting() {
            return;
        }
        let mut state = self.lock();
        state.menu_open = !state.menu_open;
    }

    pub async fn delete(&self) -> ActionOutcome {
        if self.is_deleting() {
            return ActionOutcome::Disabled;
        }

        let class = self.class();
        if class.id.is_empty() {
            warn!("Refusing to delete a class without id");
            self.ctx
                .feedback
                .notify(Notice::warning("Class ID is missing", ""))
                .await;
            return ActionOutcome::Invalid("Class ID is missing".to_string());
        }

        let prompt = Prompt::new(
            "Delete class?",
            format!(
                "Are you sure you want to delete \"{}\"? This action cannot be undone.",
                class.name
            ),
        )
        .confirm_label("Delete");
        if !self.ctx.feedback.confirm(&prompt).await {
            return ActionOutcome::Declined;
        }

        match self.delete.mutate(class.id.clone()).await {
            Ok(()) => {
                self.lock().menu_open = false;
                self.ctx
                    .feedback
                    .notify(
                        Notice::success("Deleted!", format!("Class \"{}\" deleted.", class.name))
                            .with_timer(1500),
                    )
                    .await;
                if let Some(callback) = &self.on_deleted {
                    callback(&class.id);
                }
                ActionOutcome::Done
            }
            Err(e) if e.is_busy() => ActionOutcome::Disabled,
            Err(e) => {
                self.ctx
                    .feedback
                    .notify(failure_notice(&e, "Failed to delete class"))
                    .await;
                ActionOutcome::Failed(e)
            }
        }
    }

    pub fn render(&self) -> String {
        let state = self.lock();
        let class = &state.class;
        let mut out = format!(
            "{}\n{}\n{}\nClass Code: {}\n",
            class.name, class.teacher, class.description, class.code
        );
        if state.menu_open {
            let label = if self.delete.is_pending() {
                "Deleting..."
            } else {
                "Delete Class"
            };
            out.push_str(&format!("[{label}]\n"));
        }
        out
    }
}
