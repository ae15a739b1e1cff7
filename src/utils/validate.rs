use crate::config::UploadConfig;
use crate::models::submissions::requests::UploadFile;
use crate::utils::validate_magic_bytes;

/// 公告/评论内容校验：去掉首尾空白后不能为空
pub fn validate_message(message: &str) -> Result<(), &'static str> {
    if message.trim().is_empty() {
        return Err("Message cannot be empty");
    }
    Ok(())
}

/// 评论内容校验，提示文本与公告不同
pub fn validate_comment(message: &str) -> Result<(), &'static str> {
    validate_message(message).map_err(|_| "Comment cannot be empty")
}

/// 提交文件校验
///
/// 依次检查：
/// - 扩展名在允许列表内
/// - 文件非空且不超过大小限制
/// - 文件头与扩展名一致
pub fn validate_upload(file: &UploadFile, upload: &UploadConfig) -> Result<(), String> {
    let extension = file.extension();
    if !upload
        .allowed_types
        .iter()
        .any(|t| t.to_lowercase() == extension)
    {
        return Err(format!(
            "File type not allowed. Allowed types: {}",
            upload.allowed_types.join(", ")
        ));
    }

    if file.size() == 0 {
        return Err("File is empty".to_string());
    }

    if file.size() > upload.max_size {
        return Err(format!(
            "File is too large (max {} bytes)",
            upload.max_size
        ));
    }

    if !validate_magic_bytes(&file.bytes, &extension) {
        return Err("File content does not match its extension".to_string());
    }

    Ok(())
}
