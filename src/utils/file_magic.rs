/// 验证文件内容的魔术字节是否与扩展名匹配
///
/// # Arguments
/// * `data` - 文件内容的前几个字节
/// * `extension` - 文件扩展名（包含点号，如 ".pdf"）
///
/// # Returns
/// * `true` - 魔术字节匹配或该类型不需要验证
/// * `false` - 魔术字节不匹配
pub fn validate_magic_bytes(data: &[u8], extension: &str) -> bool {
    if data.is_empty() {
        return false;
    }

    match extension.to_lowercase().as_str() {
        // 文档格式
        ".pdf" => data.starts_with(b"%PDF"),
        // MS Office 旧格式 (OLE Compound Document)
        ".doc" => data.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]),
        // OOXML 与 zip 同为 PK 头
        ".docx" | ".zip" => data.starts_with(&[0x50, 0x4B, 0x03, 0x04]),

        // 纯文本不能含 NUL
        ".txt" | ".md" | ".csv" => !data.contains(&0),

        // 未知格式 - 默认拒绝
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_magic() {
        let pdf_header = b"%PDF-1.4";
        assert!(validate_magic_bytes(pdf_header, ".pdf"));
        assert!(validate_magic_bytes(pdf_header, ".PDF"));
        assert!(!validate_magic_bytes(pdf_header, ".doc"));
    }

    #[test]
    fn test_office_and_zip_magic() {
        let ole = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1, 0x00];
        assert!(validate_magic_bytes(&ole, ".doc"));
        assert!(!validate_magic_bytes(&ole, ".docx"));

        let pk = [0x50, 0x4B, 0x03, 0x04, 0x14, 0x00];
        assert!(validate_magic_bytes(&pk, ".docx"));
        assert!(validate_magic_bytes(&pk, ".zip"));
        assert!(!validate_magic_bytes(&pk, ".pdf"));
    }

    #[test]
    fn test_text_files() {
        assert!(validate_magic_bytes(b"Hello, World!", ".txt"));
        assert!(!validate_magic_bytes(b"bin\0ary", ".txt"));
    }

    #[test]
    fn test_empty_data() {
        assert!(!validate_magic_bytes(&[], ".pdf"));
        assert!(!validate_magic_bytes(&[], ".txt"));
    }

    #[test]
    fn test_unknown_extension() {
        let data = [0x4D, 0x5A, 0x90, 0x00];
        assert!(!validate_magic_bytes(&data, ".exe"));
        assert!(!validate_magic_bytes(&data, ""));
    }
}
