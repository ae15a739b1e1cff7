use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::warn;

use super::{ActionOutcome, Notice};
use crate::hooks::UseMutation;
use crate::hooks::assignments::{SubmitAssignment, UseSubmitAssignment};
use crate::models::{
    assignments::entities::{Assignment, Urgency},
    submissions::requests::{SubmitAssignmentRequest, UploadFile},
};
use crate::runtime::ClientContext;
use crate::utils::validate_upload;

/// 提交流程
///
/// `Idle → Selecting → Ready → Submitting → Submitted`，
/// 提交失败回到 `Ready` 并保留已选文件。`Submitted` 只在本次会话内有效。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionPhase {
    Idle,
    Selecting,
    Ready(UploadFile),
    Submitting(UploadFile),
    Submitted,
}

/// 作业卡片：截止时间提示与文件提交
pub struct AssignmentCard {
    ctx: ClientContext,
    assignment: Assignment,
    submit: UseSubmitAssignment,
    phase: Mutex<SubmissionPhase>,
}

impl AssignmentCard {
    pub fn new(ctx: &ClientContext, assignment: Assignment) -> Self {
        Self {
            ctx: ctx.clone(),
            assignment,
            submit: UseMutation::new(ctx, SubmitAssignment),
            phase: Mutex::new(SubmissionPhase::Idle),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SubmissionPhase> {
        self.phase.lock().expect("Submission phase lock poisoned")
    }

    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.lock().clone()
    }

    pub fn is_submitted(&self) -> bool {
        *self.lock() == SubmissionPhase::Submitted
    }

    pub fn is_submitting(&self) -> bool {
        matches!(*self.lock(), SubmissionPhase::Submitting(_))
    }

    /// 打开上传面板
    pub fn open_upload(&self) -> ActionOutcome {
        let mut phase = self.lock();
        match *phase {
            SubmissionPhase::Idle => {
                *phase = SubmissionPhase::Selecting;
                ActionOutcome::Done
            }
            SubmissionPhase::Selecting | SubmissionPhase::Ready(_) => ActionOutcome::Done,
            SubmissionPhase::Submitting(_) | SubmissionPhase::Submitted => ActionOutcome::Disabled,
        }
    }

    /// 选择文件；校验失败时保留之前的选择
    pub async fn select_file(&self, file: UploadFile) -> ActionOutcome {
        if let Err(msg) = validate_upload(&file, &self.ctx.upload) {
            warn!(file = %file.file_name, "Rejected upload: {}", msg);
            self.ctx
                .feedback
                .notify(Notice::warning("Invalid file", msg.clone()))
                .await;
            return ActionOutcome::Invalid(msg);
        }

        let mut phase = self.lock();
        match *phase {
            SubmissionPhase::Idle | SubmissionPhase::Selecting | SubmissionPhase::Ready(_) => {
                *phase = SubmissionPhase::Ready(file);
                ActionOutcome::Done
            }
            SubmissionPhase::Submitting(_) | SubmissionPhase::Submitted => ActionOutcome::Disabled,
        }
    }

    /// 关闭上传面板并丢弃已选文件；提交进行中不可取消
    pub fn cancel_upload(&self) -> ActionOutcome {
        let mut phase = self.lock();
        match *phase {
            SubmissionPhase::Submitting(_) | SubmissionPhase::Submitted => ActionOutcome::Disabled,
            _ => {
                *phase = SubmissionPhase::Idle;
                ActionOutcome::Done
            }
        }
    }

    pub async fn submit(&self) -> ActionOutcome {
        let file = {
            let mut phase = self.lock();
            match &*phase {
                SubmissionPhase::Ready(file) => {
                    let file = file.clone();
                    *phase = SubmissionPhase::Submitting(file.clone());
                    Some(file)
                }
                SubmissionPhase::Submitting(_) | SubmissionPhase::Submitted => {
                    return ActionOutcome::Disabled;
                }
                SubmissionPhase::Idle | SubmissionPhase::Selecting => None,
            }
        };

        let Some(file) = file else {
            self.ctx
                .feedback
                .notify(Notice::warning("Select a file first", ""))
                .await;
            return ActionOutcome::Invalid("Select a file first".to_string());
        };

        let request = SubmitAssignmentRequest {
            assignment_id: self.assignment.id.clone(),
            file: file.clone(),
        };
        match self.submit.mutate(request).await {
            Ok(()) => {
                *self.lock() = SubmissionPhase::Submitted;
                self.ctx
                    .feedback
                    .notify(
                        Notice::success("Submitted!", "Assignment submitted successfully.")
                            .with_timer(1500),
                    )
                    .await;
                ActionOutcome::Done
            }
            Err(e) => {
                *self.lock() = SubmissionPhase::Ready(file);
                if e.is_busy() {
                    return ActionOutcome::Disabled;
                }
                self.ctx
                    .feedback
                    .notify(Notice::error("Upload failed", "Please try again."))
                    .await;
                ActionOutcome::Failed(e)
            }
        }
    }

    pub fn render(&self) -> String {
        self.render_at(Utc::now())
    }

    pub fn render_at(&self, now: DateTime<Utc>) -> String {
        let assignment = &self.assignment;
        let urgency = assignment.urgency(now);
        let marker = match urgency {
            Urgency::Overdue => "!",
            Urgency::DueSoon { .. } => "*",
            Urgency::Normal { .. } => " ",
        };

        let mut out = format!("{} {}\n", marker, assignment.title);
        if !assignment.description.is_empty() {
            out.push_str(&format!("  {}\n", assignment.description));
        }
        out.push_str(&format!(
            "  Due: {} ({})\n",
            assignment.due_date.format("%Y-%m-%d %H:%M"),
            urgency.label()
        ));

        match &*self.lock() {
            SubmissionPhase::Idle => out.push_str("  [Submit Assignment]\n"),
            SubmissionPhase::Selecting => out.push_str(&format!(
                "  Choose a file ({})\n  [Cancel]\n",
                self.ctx.upload.allowed_types.join(", ")
            )),
            SubmissionPhase::Ready(file) => out.push_str(&format!(
                "  Selected: {} ({} bytes)\n  [Cancel] [Submit]\n",
                file.file_name,
                file.size()
            )),
            SubmissionPhase::Submitting(file) => out.push_str(&format!(
                "  Selected: {} ({} bytes)\n  [Submitting...]\n",
                file.file_name,
                file.size()
            )),
            SubmissionPhase::Submitted => out.push_str("  ✓ Submitted\n"),
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
    use crate::testing::{MockApi, ScriptedFeedback, assignment, context, fixed_now};

    fn pdf() -> UploadFile {
        UploadFile::new("report.pdf", b"%PDF-1.7 body".to_vec())
    }

    fn card(api: &std::sync::Arc<MockApi>, feedback: &std::sync::Arc<ScriptedFeedback>) -> AssignmentCard {
        AssignmentCard::new(
            &context(api, feedback),
            assignment("a1", "c1", "Lab report", fixed_now() + Duration::days(3)),
        )
    }

    #[tokio::test]
    async fn test_submit_without_file_is_noop() {
        let api = MockApi::new();
        let feedback = ScriptedFeedback::confirming();
        let card = card(&api, &feedback);
        card.open_upload();

        assert_eq!(
            card.submit().await,
            ActionOutcome::Invalid("Select a file first".to_string())
        );
        assert_eq!(card.phase(), SubmissionPhase::Selecting);
        assert!(api.calls().is_empty());
        assert_eq!(feedback.notices()[0].level, NoticeLevel::Warning);
    }

    #[tokio::test]
    async fn test_successful_submission_hides_upload_controls() {
        let api = MockApi::new();
        let feedback = ScriptedFeedback::confirming();
        let card = card(&api, &feedback);

        card.open_upload();
        assert!(card.select_file(pdf()).await.is_done());
        assert!(card.submit().await.is_done());

        assert!(card.is_submitted());
        assert_eq!(api.calls(), vec!["POST /submit-assignment a1 report.pdf"]);
        let text = card.render_at(fixed_now());
        assert!(text.contains("✓ Submitted"));
        assert!(!text.contains("Submit Assignment"));
        assert_eq!(feedback.notices()[0].title, "Submitted!");
        assert_eq!(card.open_upload(), ActionOutcome::Disabled);
    }

    #[tokio::test]
    async fn test_failed_submission_keeps_file() {
        let api = MockApi::new();
        api.fail("submit_assignment", ClassroomError::network("reset by peer"));
        let feedback = ScriptedFeedback::confirming();
        let card = card(&api, &feedback);

        card.select_file(pdf()).await;
        assert!(matches!(card.submit().await, ActionOutcome::Failed(_)));

        assert_eq!(card.phase(), SubmissionPhase::Ready(pdf()));
        let notice = &feedback.notices()[0];
        assert_eq!(notice.title, "Upload failed");
        assert_eq!(notice.text, "Please try again.");
    }

    #[tokio::test]
    async fn test_invalid_file_keeps_previous_selection() {
        let api = MockApi::new();
        let feedback = ScriptedFeedback::confirming();
        let card = card(&api, &feedback);
        card.select_file(pdf()).await;

        let outcome = card
            .select_file(UploadFile::new("setup.exe", b"MZ\x90\x00".to_vec()))
            .await;
        assert!(matches!(outcome, ActionOutcome::Invalid(_)));
        assert_eq!(card.phase(), SubmissionPhase::Ready(pdf()));

        let outcome = card
            .select_file(UploadFile::new("fake.pdf", b"not a pdf".to_vec()))
            .await;
        assert!(matches!(outcome, ActionOutcome::Invalid(_)));
        assert_eq!(card.phase(), SubmissionPhase::Ready(pdf()));
    }

    #[tokio::test]
    async fn test_cancel_disabled_while_submitting() {
        let api = MockApi::new();
        let gate = api.hold();
        let feedback = ScriptedFeedback::confirming();
        let card = card(&api, &feedback);
        card.select_file(pdf()).await;

        let (submitted, during) = tokio::join!(card.submit(), async {
            api.wait_for_calls(1).await;
            let during = (
                card.is_submitting(),
                card.cancel_upload(),
                card.submit().await,
                card.render_at(fixed_now()),
            );
            gate.notify_one();
            during
        });

        assert!(submitted.is_done());
        assert!(during.0);
        assert_eq!(during.1, ActionOutcome::Disabled);
        assert_eq!(during.2, ActionOutcome::Disabled);
        assert!(during.3.contains("[Submitting...]"));
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_render_urgency() {
        let api = MockApi::new();
        let feedback = ScriptedFeedback::confirming();
        let ctx = context(&api, &feedback);

        let overdue = AssignmentCard::new(
            &ctx,
            assignment("a1", "c1", "Essay", fixed_now() - Duration::days(1)),
        );
        assert!(overdue.render_at(fixed_now()).contains("OVERDUE"));

        let soon = AssignmentCard::new(
            &ctx,
            assignment("a2", "c1", "Quiz", fixed_now() + Duration::hours(5)),
        );
        let text = soon.render_at(fixed_now());
        assert!(text.starts_with("* Quiz"));
        assert!(text.contains("1 days left"));
        assert!(text.contains("[Submit Assignment]"));
    }
}
