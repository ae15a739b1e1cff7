use std::path::Path;

/// 待上传的文件，内容已读入内存
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// 从磁盘读取文件，文件名取路径的最后一段
    pub async fn from_path(path: impl AsRef<Path>) -> crate::errors::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();
        Ok(Self::new(file_name, bytes))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// 小写扩展名（包含点号，如 ".pdf"），没有扩展名时为空串
    pub fn extension(&self) -> String {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_lowercase()))
            .unwrap_or_default()
    }

    /// 按扩展名推断 MIME 类型
    pub fn content_type(&self) -> &'static str {
        match self.extension().as_str() {
            ".pdf" => "application/pdf",
            ".doc" => "application/msword",
            ".docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            ".txt" => "text/plain",
            ".zip" => "application/zip",
            _ => "application/octet-stream",
        }
    }
}

/// 提交作业请求（multipart：`file` + `assignmentId`）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitAssignmentRequest {
    pub assignment_id: String,
    pub file: UploadFile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_and_mime() {
        let file = UploadFile::new("Report.PDF", b"%PDF-1.7".to_vec());
        assert_eq!(file.extension(), ".pdf");
        assert_eq!(file.content_type(), "application/pdf");

        let file = UploadFile::new("notes", b"plain".to_vec());
        assert_eq!(file.extension(), "");
        assert_eq!(file.content_type(), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_from_missing_path() {
        let err = UploadFile::from_path("/nonexistent/report.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, crate::errors::ClassroomError::FileOperation(_)));
    }
}
