// Binary sniffer - magic bytes, data URLs and control character ratio
use crate::models::BinaryInfo;
use reqwest::Url;

const OCTET_STREAM_DATA_URL: &str = "data:application/octet-stream;base64,";

/// Content is only judged by ratio once it is longer than this
const RATIO_MIN_LENGTH: usize = 100;
const NON_PRINTABLE_RATIO: f64 = 0.3;

struct MagicSignature {
    prefix: &'static str,
    mime_type: &'static str,
    extension: &'static str,
}

const MAGIC_SIGNATURES: &[MagicSignature] = &[
    MagicSignature {
        prefix: "PK",
        mime_type: "application/zip",
        extension: ".zip",
    },
    MagicSignature {
        prefix: "Rar!",
        mime_type: "application/x-rar-compressed",
        extension: ".rar",
    },
    MagicSignature {
        prefix: "\x7fELF",
        mime_type: "application/x-executable",
        extension: ".bin",
    },
    MagicSignature {
        prefix: "%PDF",
        mime_type: "application/pdf",
        extension: ".pdf",
    },
];

/// Decide whether fetched text is really a binary payload
pub fn detect_binary(content: &str, source_url: Option<&str>) -> BinaryInfo {
    if let Some(payload) = content.strip_prefix(OCTET_STREAM_DATA_URL) {
        return BinaryInfo {
            is_binary: true,
            mime_type: Some("application/octet-stream".to_string()),
            file_extension: file_extension(source_url),
            file_name: file_name(source_url),
            size: Some(estimate_base64_size(payload)),
            warning: Some("This is a binary file, not a script".to_string()),
        };
    }

    if content.starts_with("MZ") {
        return BinaryInfo {
            is_binary: true,
            mime_type: Some("application/x-msdownload".to_string()),
            file_extension: Some(".exe".to_string()),
            file_name: file_name(source_url),
            size: None,
            warning: Some("This is a Windows executable file".to_string()),
        };
    }

    if let Some(sig) = MAGIC_SIGNATURES
        .iter()
        .find(|sig| content.starts_with(sig.prefix))
    {
        return BinaryInfo {
            is_binary: true,
            mime_type: Some(sig.mime_type.to_string()),
            file_extension: Some(sig.extension.to_string()),
            file_name: file_name(source_url),
            size: None,
            warning: Some(format!("This is a {} file, not a script", sig.extension)),
        };
    }

    let total = content.chars().count();
    if total > RATIO_MIN_LENGTH {
        let non_printable = content
            .chars()
            .filter(|&c| (c as u32) < 32 && c != '\t' && c != '\n' && c != '\r')
            .count();
        if non_printable as f64 / total as f64 > NON_PRINTABLE_RATIO {
            return BinaryInfo {
                is_binary: true,
                mime_type: Some("application/octet-stream".to_string()),
                file_extension: file_extension(source_url),
                file_name: file_name(source_url),
                size: None,
                warning: Some(
                    "This appears to be a binary file based on content analysis".to_string(),
                ),
            };
        }
    }

    BinaryInfo::text()
}

/// Decoded size of a base64 payload
fn estimate_base64_size(payload: &str) -> u64 {
    (payload.len() as u64 * 3) / 4
}

/// Last path segment of a URL, if it names a file
pub fn file_name(url: Option<&str>) -> Option<String> {
    let url = Url::parse(url?).ok()?;
    url.path_segments()?
        .last()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

pub fn file_extension(url: Option<&str>) -> Option<String> {
    let name = file_name(url)?;
    name.rfind('.').map(|dot| name[dot..].to_string())
}
