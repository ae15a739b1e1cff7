//! 原地编辑状态机（公告与评论共用）
//!
//! `Viewing → Editing → Saving → Viewing`（保存成功）
//! `Saving → Editing`（保存失败，保留用户输入）
//! `Editing → Viewing`（取消，恢复上次成功保存的内容）
//!
//! 保存进行中不允许取消。

use crate::errors::{ClassroomError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPhase {
    Viewing,
    Editing,
    Saving,
}

#[derive(Debug, Clone)]
pub struct EditBuffer {
    committed: String,
    buffer: String,
    phase: EditPhase,
}

impl EditBuffer {
    pub fn new(committed: impl Into<String>) -> Self {
        let committed = committed.into();
        Self {
            buffer: committed.clone(),
            committed,
            phase: EditPhase::Viewing,
        }
    }

    pub fn phase(&self) -> EditPhase {
        self.phase
    }

    pub fn is_editing(&self) -> bool {
        self.phase != EditPhase::Viewing
    }

    pub fn is_saving(&self) -> bool {
        self.phase == EditPhase::Saving
    }

    /// 最近一次成功保存的内容
    pub fn committed(&self) -> &str {
        &self.committed
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// 进入编辑，用当前内容填充缓冲区
    pub fn begin(&mut self) -> Result<()> {
        match self.phase {
            EditPhase::Viewing => {
                self.buffer = self.committed.clone();
                self.phase = EditPhase::Editing;
                Ok(())
            }
            EditPhase::Editing => Ok(()),
            EditPhase::Saving => Err(ClassroomError::busy("Save in progress")),
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> Result<()> {
        if self.phase != EditPhase::Editing {
            return Err(ClassroomError::validation("Not in edit mode"));
        }
        self.buffer = text.into();
        Ok(())
    }

    /// 校验并进入保存状态，返回要提交的内容
    ///
    /// 校验失败时保持编辑状态，不应发出任何请求。
    pub fn begin_save(
        &mut self,
        validate: impl Fn(&str) -> std::result::Result<(), &'static str>,
    ) -> Result<String> {
        match self.phase {
            EditPhase::Editing => {}
            EditPhase::Saving => return Err(ClassroomError::busy("Save in progress")),
            EditPhase::Viewing => return Err(ClassroomError::validation("Not in edit mode")),
        }
        validate(&self.buffer).map_err(ClassroomError::validation)?;
        self.phase = EditPhase::Saving;
        Ok(self.buffer.clone())
    }

    pub fn save_succeeded(&mut self) {
        if self.phase == EditPhase::Saving {
            self.committed = std::mem::take(&mut self.buffer);
            self.buffer = self.committed.clone();
            self.phase = EditPhase::Viewing;
        }
    }

    pub fn save_failed(&mut self) {
        if self.phase == EditPhase::Saving {
            self.phase = EditPhase::Editing;
        }
    }

    /// 放弃编辑，恢复上次成功保存的内容
    pub fn cancel(&mut self) -> Result<()> {
        if self.phase == EditPhase::Saving {
            return Err(ClassroomError::busy("Cannot cancel while saving"));
        }
        self.buffer = self.committed.clone();
        self.phase = EditPhase::Viewing;
        Ok(())
    }
}
