//! 上传文件内容校验
//!
//! 根据文件头识别常见格式，并检查是否与声明的扩展名一致。

/// 可识别的文件签名
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSignature {
    Png,
    Jpeg,
    Gif,
    Pdf,
    // MS Office 旧格式 (OLE Compound Document)
    OleCompound,
    // zip 以及基于 zip 的 OOXML
    Zip,
    Rar,
    SevenZip,
    Gzip,
}

impl FileSignature {
    const TABLE: &'static [(FileSignature, &'static [u8])] = &[
        (FileSignature::Png, &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
        (FileSignature::Jpeg, &[0xFF, 0xD8, 0xFF]),
        (FileSignature::Gif, b"GIF8"),
        (FileSignature::Pdf, b"%PDF"),
        (
            FileSignature::OleCompound,
            &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1],
        ),
        (FileSignature::Zip, &[0x50, 0x4B, 0x03, 0x04]),
        (FileSignature::Rar, b"Rar!"),
        (FileSignature::SevenZip, &[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C]),
        (FileSignature::Gzip, &[0x1F, 0x8B]),
    ];

    /// 根据文件头识别签名
    pub fn detect(data: &[u8]) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(_, magic)| data.starts_with(magic))
            .map(|(sig, _)| *sig)
    }
}

/// 扩展名对应的内容要求
enum Expected {
    Signature(&'static [FileSignature]),
    // 纯文本：开头不允许出现 NUL 字节
    Text,
}

fn expected_for(extension: &str) -> Option<Expected> {
    use FileSignature::*;
    let expected = match extension {
        ".png" => Expected::Signature(&[Png]),
        ".jpg" | ".jpeg" => Expected::Signature(&[Jpeg]),
        ".gif" => Expected::Signature(&[Gif]),
        ".pdf" => Expected::Signature(&[Pdf]),
        ".doc" | ".xls" | ".ppt" => Expected::Signature(&[OleCompound]),
        ".docx" | ".xlsx" | ".pptx" | ".zip" => Expected::Signature(&[Zip]),
        ".rar" => Expected::Signature(&[Rar]),
        ".7z" => Expected::Signature(&[SevenZip]),
        ".gz" => Expected::Signature(&[Gzip]),
        ".txt" | ".md" | ".csv" | ".json" | ".py" | ".rs" | ".java" | ".c" | ".cpp" => {
            Expected::Text
        }
        _ => return None,
    };
    Some(expected)
}

const TEXT_SNIFF_LEN: usize = 1024;

/// 验证文件内容的魔术字节是否与扩展名匹配
///
/// `extension` 包含点号，如 ".png"，大小写不敏感。未知扩展名一律拒绝。
pub fn validate_magic_bytes(data: &[u8], extension: &str) -> bool {
    if data.is_empty() {
        return false;
    }

    match expected_for(&extension.to_lowercase()) {
        Some(Expected::Signature(allowed)) => {
            FileSignature::detect(data).is_some_and(|sig| allowed.contains(&sig))
        }
        Some(Expected::Text) => !data[..data.len().min(TEXT_SNIFF_LEN)].contains(&0),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(
            FileSignature::detect(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00]),
            Some(FileSignature::Png)
        );
        assert_eq!(FileSignature::detect(b"%PDF-1.7"), Some(FileSignature::Pdf));
        assert_eq!(FileSignature::detect(b"hello"), None);
    }

    #[test]
    fn test_png_vs_jpg() {
        let png_header = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert!(validate_magic_bytes(&png_header, ".png"));
        assert!(validate_magic_bytes(&png_header, ".PNG"));
        assert!(!validate_magic_bytes(&png_header, ".jpg"));
    }

    #[test]
    fn test_office_documents() {
        let zip = [0x50, 0x4B, 0x03, 0x04, 0x14, 0x00];
        assert!(validate_magic_bytes(&zip, ".docx"));
        assert!(validate_magic_bytes(&zip, ".zip"));
        assert!(!validate_magic_bytes(&zip, ".doc"));
    }

    #[test]
    fn test_text_files() {
        assert!(validate_magic_bytes(b"# Homework 1\n", ".md"));
        assert!(validate_magic_bytes(b"fn main() {}", ".rs"));
        assert!(!validate_magic_bytes(b"bin\0ary", ".txt"));
    }

    #[test]
    fn test_empty_and_unknown() {
        assert!(!validate_magic_bytes(&[], ".txt"));
        assert!(!validate_magic_bytes(b"MZ\x90\x00", ".exe"));
    }
}
