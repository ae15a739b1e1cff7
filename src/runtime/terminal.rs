//! 终端反馈：确认框读取一行输入，提示按级别着色输出

use async_trait::async_trait;
use console::{Term, style};
use tracing::{debug, error};

use crate::components::{Feedback, Notice, NoticeLevel, Prompt};

pub struct TerminalFeedback {
    // 自动确认所有提示（--yes）
    assume_yes: bool,
}

impl TerminalFeedback {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn format_notice(notice: &Notice) -> String {
    let title = match notice.level {
        NoticeLevel::Success => style(format!("✓ {}", notice.title)).green().bold(),
        NoticeLevel::Warning => style(format!("! {}", notice.title)).yellow().bold(),
        NoticeLevel::Error => style(format!("✗ {}", notice.title)).red().bold(),
    };
    if notice.text.is_empty() {
        title.to_string()
    } else {
        format!("{} {}", title, notice.text)
    }
}

#[async_trait]
impl Feedback for TerminalFeedback {
    async fn confirm(&self, prompt: &Prompt) -> bool {
        let term = Term::stderr();
        let question = format!(
            "{} {} [{} / cancel] ",
            style(&prompt.title).bold(),
            prompt.text,
            prompt.confirm_label
        );

        if self.assume_yes {
            let _ = term.write_line(&format!("{question}{}", style("yes").dim()));
            return true;
        }

        let answer = tokio::task::spawn_blocking(move || {
            term.write_str(&question)?;
            term.read_line()
        })
        .await;

        match answer {
            Ok(Ok(line)) => {
                debug!("Confirmation answer: {:?}", line);
                is_yes(&line)
            }
            Ok(Err(e)) => {
                error!("Failed to read confirmation: {}", e);
                false
            }
            Err(e) => {
                error!("Confirmation task failed: {}", e);
                false
            }
        }
    }

    async fn notify(&self, notice: Notice) {
        if let Err(e) = Term::stdout().write_line(&format_notice(&notice)) {
            error!("Failed to print notice: {}", e);
        }
    }
}
