use std::sync::{Mutex, MutexGuard};

use tracing::{error, warn};

use super::{ActionOutcome, EditBuffer, EditPhase, Notice, Prompt, failure_notice};
use crate::errors::{ClassroomError, Result};
use crate::hooks::comments::{
    CreateComment, CreateCommentArgs, DeleteComment, GetComments, UpdateComment,
    UpdateCommentArgs, UseCreateComment, UseDeleteComment, UseGetComments, UseUpdateComment,
};
use crate::hooks::posts::{DeletePost, UpdatePost, UpdatePostArgs, UseDeletePost, UseUpdatePost};
use crate::hooks::{UseMutation, UseQuery};
use crate::models::{comments::entities::Comment, posts::entities::Post};
use crate::runtime::ClientContext;
use crate::utils::{validate_comment, validate_message};

type DeletedCallback = Box<dyn Fn(&str) + Send + Sync>;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

struct PostCardState {
    post: Post,
    menu_open: bool,
    edit: EditBuffer,
    show_comments: bool,
    new_comment: String,
    // 正在编辑的评论ID及其编辑缓冲区
    comment_edit: Option<(String, EditBuffer)>,
}

/// 公告卡片：原地编辑、删除，以及评论区
pub struct PostCard {
    ctx: ClientContext,
    update: UseUpdatePost,
    delete: UseDeletePost,
    comments: UseGetComments,
    create_comment: UseCreateComment,
    update_comment: UseUpdateComment,
    delete_comment: UseDeleteComment,
    on_deleted: Option<DeletedCallback>,
    state: Mutex<PostCardState>,
}

impl PostCard {
    pub fn new(ctx: &ClientContext, post: Post) -> Self {
        let comments = UseQuery::new(
            ctx,
            GetComments {
                post_id: post.id.clone(),
            },
        );
        Self {
            ctx: ctx.clone(),
            update: UseMutation::new(ctx, UpdatePost),
            delete: UseMutation::new(ctx, DeletePost),
            comments,
            create_comment: UseMutation::new(ctx, CreateComment),
            update_comment: UseMutation::new(ctx, UpdateComment),
            delete_comment: UseMutation::new(ctx, DeleteComment),
            on_deleted: None,
            state: Mutex::new(PostCardState {
                edit: EditBuffer::new(post.message.clone()),
                post,
                menu_open: false,
                show_comments: false,
                new_comment: String::new(),
                comment_edit: None,
            }),
        }
    }

    /// 删除成功后通知父级列表移除该公告
    pub fn on_deleted(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_deleted = Some(Box::new(callback));
        self
    }

    fn lock(&self) -> MutexGuard<'_, PostCardState> {
        self.state.lock().expect("Post card state lock poisoned")
    }

    fn post_id(&self) -> String {
        self.lock().post.id.clone()
    }

    pub fn post(&self) -> Post {
        self.lock().post.clone()
    }

    pub fn is_menu_open(&self) -> bool {
        self.lock().menu_open
    }

    pub fn edit_phase(&self) -> EditPhase {
        self.lock().edit.phase()
    }

    pub fn edit_text(&self) -> String {
        self.lock().edit.buffer().to_string()
    }

    pub fn is_updating(&self) -> bool {
        self.update.is_pending()
    }

    pub fn is_deleting(&self) -> bool {
        self.delete.is_pending()
    }

    fn post_actions_disabled(&self) -> bool {
        self.is_updating() || self.is_deleting()
    }

    pub fn toggle_menu(&self) {
        if self.post_actions_disabled() {
            return;
        }
        let mut state = self.lock();
        state.menu_open = !state.menu_open;
    }

    // ---------- 公告编辑 ----------

    pub fn start_edit(&self) -> ActionOutcome {
        if self.post_actions_disabled() {
            return ActionOutcome::Disabled;
        }
        let mut state = self.lock();
        match state.edit.begin() {
            Ok(()) => {
                state.menu_open = false;
                ActionOutcome::Done
            }
            Err(_) => ActionOutcome::Disabled,
        }
    }

    pub fn set_edit_text(&self, text: impl Into<String>) -> Result<()> {
        self.lock().edit.set_text(text)
    }

    pub async fn save(&self) -> ActionOutcome {
        let prepared = self.lock().edit.begin_save(validate_message);
        let message = match prepared {
            Ok(message) => message,
            Err(e) if e.is_busy() => return ActionOutcome::Disabled,
            Err(e) => return self.reject(e).await,
        };

        let args = UpdatePostArgs {
            post_id: self.post_id(),
            message: message.clone(),
        };
        match self.update.mutate(args).await {
            Ok(()) => {
                {
                    let mut state = self.lock();
                    state.edit.save_succeeded();
                    state.post.message = message;
                    state.menu_open = false;
                }
                self.ctx
                    .feedback
                    .notify(Notice::success("Saved!", "Post updated.").with_timer(1500))
                    .await;
                ActionOutcome::Done
            }
            Err(e) => {
                self.lock().edit.save_failed();
                if e.is_busy() {
                    return ActionOutcome::Disabled;
                }
                self.ctx
                    .feedback
                    .notify(failure_notice(&e, "Failed to update post"))
                    .await;
                ActionOutcome::Failed(e)
            }
        }
    }

    /// 取消编辑；保存进行中时按钮被禁用
    pub fn cancel_edit(&self) -> ActionOutcome {
        match self.lock().edit.cancel() {
            Ok(()) => ActionOutcome::Done,
            Err(_) => ActionOutcome::Disabled,
        }
    }

    pub async fn delete(&self) -> ActionOutcome {
        if self.post_actions_disabled() {
            return ActionOutcome::Disabled;
        }

        let prompt = Prompt::new("Delete post?", "Are you sure you want to delete this post?")
            .confirm_label("Delete");
        if !self.ctx.feedback.confirm(&prompt).await {
            return ActionOutcome::Declined;
        }

        let post_id = self.post_id();
        match self.delete.mutate(post_id.clone()).await {
            Ok(()) => {
                self.lock().menu_open = false;
                self.ctx
                    .feedback
                    .notify(Notice::success("Deleted!", "Post deleted.").with_timer(1500))
                    .await;
                if let Some(callback) = &self.on_deleted {
                    callback(&post_id);
                }
                ActionOutcome::Done
            }
            Err(e) if e.is_busy() => ActionOutcome::Disabled,
            Err(e) => {
                self.ctx
                    .feedback
                    .notify(failure_notice(&e, "Failed to delete post"))
                    .await;
                ActionOutcome::Failed(e)
            }
        }
    }

    // ---------- 评论 ----------

    /// 挂载时加载评论（读穿缓存）
    pub async fn load_comments(&self) -> Result<Vec<Comment>> {
        self.comments.fetch().await
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.comments.data()
    }

    pub fn toggle_comments(&self) {
        let mut state = self.lock();
        state.show_comments = !state.show_comments;
    }

    pub fn set_new_comment(&self, text: impl Into<String>) {
        self.lock().new_comment = text.into();
    }

    pub fn new_comment(&self) -> String {
        self.lock().new_comment.clone()
    }

    pub async fn add_comment(&self) -> ActionOutcome {
        if self.create_comment.is_pending() {
            return ActionOutcome::Disabled;
        }

        let message = self.new_comment();
        if let Err(msg) = validate_comment(&message) {
            return self.reject(ClassroomError::validation(msg)).await;
        }

        let args = CreateCommentArgs {
            post_id: self.post_id(),
            message,
        };
        match self.create_comment.mutate(args).await {
            Ok(()) => {
                self.lock().new_comment.clear();
                self.refresh_comments().await;
                self.ctx
                    .feedback
                    .notify(Notice::success("Posted!", "Comment added.").with_timer(1500))
                    .await;
                ActionOutcome::Done
            }
            Err(e) if e.is_busy() => ActionOutcome::Disabled,
            Err(e) => {
                self.ctx
                    .feedback
                    .notify(failure_notice(&e, "Failed to add comment"))
                    .await;
                ActionOutcome::Failed(e)
            }
        }
    }

    pub fn start_comment_edit(&self, comment_id: &str) -> ActionOutcome {
        let Some(comment) = self
            .comments
            .data()
            .into_iter()
            .find(|c| c.id == comment_id)
        else {
            return ActionOutcome::Invalid(format!("Comment {comment_id} is not loaded"));
        };

        let mut state = self.lock();
        if let Some((_, edit)) = &state.comment_edit
            && edit.is_saving()
        {
            return ActionOutcome::Disabled;
        }

        let mut edit = EditBuffer::new(comment.message);
        // 新建的缓冲区处于 Viewing，begin 不会失败
        let _ = edit.begin();
        state.comment_edit = Some((comment.id, edit));
        ActionOutcome::Done
    }

    pub fn editing_comment_id(&self) -> Option<String> {
        self.lock().comment_edit.as_ref().map(|(id, _)| id.clone())
    }

    pub fn set_comment_edit_text(&self, text: impl Into<String>) -> Result<()> {
        match &mut self.lock().comment_edit {
            Some((_, edit)) => edit.set_text(text),
            None => Err(ClassroomError::validation("No comment is being edited")),
        }
    }

    pub async fn save_comment_edit(&self) -> ActionOutcome {
        if self.update_comment.is_pending() {
            return ActionOutcome::Disabled;
        }

        let prepared = match &mut self.lock().comment_edit {
            Some((id, edit)) => edit
                .begin_save(validate_comment)
                .map(|message| (id.clone(), message)),
            None => Err(ClassroomError::validation("No comment is being edited")),
        };
        let (comment_id, message) = match prepared {
            Ok(prepared) => prepared,
            Err(e) if e.is_busy() => return ActionOutcome::Disabled,
            Err(e) => return self.reject(e).await,
        };

        match self
            .update_comment
            .mutate(UpdateCommentArgs {
                comment_id,
                message,
            })
            .await
        {
            Ok(()) => {
                self.lock().comment_edit = None;
                self.refresh_comments().await;
                self.ctx
                    .feedback
                    .notify(Notice::success("Saved!", "Comment updated.").with_timer(1500))
                    .await;
                ActionOutcome::Done
            }
            Err(e) => {
                if let Some((_, edit)) = &mut self.lock().comment_edit {
                    edit.save_failed();
                }
                if e.is_busy() {
                    return ActionOutcome::Disabled;
                }
                self.ctx
                    .feedback
                    .notify(failure_notice(&e, "Failed to update comment"))
                    .await;
                ActionOutcome::Failed(e)
            }
        }
    }

    pub fn cancel_comment_edit(&self) -> ActionOutcome {
        let mut state = self.lock();
        let result = match &mut state.comment_edit {
            Some((_, edit)) => edit.cancel(),
            None => Ok(()),
        };
        match result {
            Ok(()) => {
                state.comment_edit = None;
                ActionOutcome::Done
            }
            Err(_) => ActionOutcome::Disabled,
        }
    }

    pub async fn delete_comment(&self, comment_id: &str) -> ActionOutcome {
        if self.delete_comment.is_pending() {
            return ActionOutcome::Disabled;
        }

        let prompt = Prompt::new("Delete comment?", "Delete this comment?").confirm_label("Delete");
        if !self.ctx.feedback.confirm(&prompt).await {
            return ActionOutcome::Declined;
        }

        match self.delete_comment.mutate(comment_id.to_string()).await {
            Ok(()) => {
                {
                    // 被删除的评论若正在编辑，一并退出编辑
                    let mut state = self.lock();
                    if state
                        .comment_edit
                        .as_ref()
                        .is_some_and(|(id, _)| id == comment_id)
                    {
                        state.comment_edit = None;
                    }
                }
                self.refresh_comments().await;
                self.ctx
                    .feedback
                    .notify(Notice::success("Deleted!", "Comment deleted.").with_timer(1500))
                    .await;
                ActionOutcome::Done
            }
            Err(e) if e.is_busy() => ActionOutcome::Disabled,
            Err(e) => {
                self.ctx
                    .feedback
                    .notify(failure_notice(&e, "Failed to delete comment"))
                    .await;
                ActionOutcome::Failed(e)
            }
        }
    }

    /// 变更成功后重新拉取评论；失败只记录日志，保留旧数据
    async fn refresh_comments(&self) {
        if let Err(e) = self.comments.refetch().await {
            error!(post_id = %self.post_id(), error = %e, "Failed to refetch comments");
        }
    }

    async fn reject(&self, err: ClassroomError) -> ActionOutcome {
        warn!(error = %err, "Rejected before sending");
        self.ctx
            .feedback
            .notify(Notice::warning(err.message(), ""))
            .await;
        ActionOutcome::Invalid(err.message().to_string())
    }

    // ---------- 渲染 ----------

    pub fn render(&self) -> String {
        let comments = self.comments.data();
        let comments_loading = self.comments.is_pending() || self.comments.is_fetching();
        let saving_label = if self.update.is_pending() {
            "Saving..."
        } else {
            "Save"
        };
        let posting_label = if self.create_comment.is_pending() {
            "..."
        } else {
            "Post"
        };

        let state = self.lock();
        let mut out = format!(
            "Demo User · {}\n",
            state.post.time.format(TIME_FORMAT)
        );

        if state.menu_open {
            out.push_str("[Edit] [Delete]\n");
        }

        if state.edit.is_editing() {
            out.push_str(&format!(
                "> {}\n[Cancel] [{}]\n",
                state.edit.buffer(),
                saving_label
            ));
        } else {
            out.push_str(&format!("{}\n", state.post.message));
        }

        out.push_str(&format!("{} Comments\n", comments.len()));
        if !state.show_comments {
            return out;
        }

        out.push_str(&format!(
            "Add a comment: {} [{}]\n",
            state.new_comment, posting_label
        ));

        if comments_loading && comments.is_empty() {
            out.push_str("Loading comments...\n");
        } else if comments.is_empty() {
            out.push_str("No comments yet\n");
        } else {
            for comment in &comments {
                out.push_str(&format!(
                    "- {} ({})\n",
                    comment.user_name,
                    comment.time.format(TIME_FORMAT)
                ));
                match &state.comment_edit {
                    Some((id, edit)) if *id == comment.id => {
                        out.push_str(&format!("  > {}\n  [Cancel] [Save]\n", edit.buffer()));
                    }
                    _ => out.push_str(&format!("  {}\n", comment.message)),
                }
            }
        }
        out
    }
}
