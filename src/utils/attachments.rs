// Attachment file naming

use std::path::Path;
use uuid::Uuid;

/// Known content types and the extension their attachments are written with
const EXTENSIONS_BY_TYPE: &[(&str, &str)] = &[
    ("application/json", "json"),
    ("application/pdf", "pdf"),
    ("application/vnd.allure.image.diff", "imagediff"),
    ("application/x-tar", "tar"),
    ("application/x-yaml", "yaml"),
    ("application/xml", "xml"),
    ("application/yaml", "yaml"),
    ("application/zip", "zip"),
    ("audio/mpeg", "mp3"),
    ("audio/ogg", "ogg"),
    ("image/bmp", "bmp"),
    ("image/gif", "gif"),
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/svg+xml", "svg"),
    ("image/tiff", "tiff"),
    ("image/webp", "webp"),
    ("text/csv", "csv"),
    ("text/html", "html"),
    ("text/plain", "txt"),
    ("text/tab-separated-values", "tsv"),
    ("text/uri-list", "uri"),
    ("text/xml", "xml"),
    ("video/mp4", "mp4"),
    ("video/ogg", "ogv"),
    ("video/webm", "webm"),
];

pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    // Ignore parameters such as "; charset=utf-8"
    let essence = content_type.split(';').next().unwrap_or("").trim();
    EXTENSIONS_BY_TYPE
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(essence))
        .map(|(_, ext)| *ext)
}

/// Pick the extension for an attachment: explicit option, then the source path,
/// then the content type table.
pub fn resolve_extension(
    file_extension: Option<&str>,
    source_path: Option<&Path>,
    content_type: &str,
) -> Option<String> {
    if let Some(ext) = file_extension.map(|e| e.trim_start_matches('.')).filter(|e| !e.is_empty()) {
        return Some(ext.to_string());
    }

    if let Some(ext) = source_path
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
    {
        return Some(ext.to_string());
    }

    extension_for_content_type(content_type).map(str::to_string)
}

/// Generated name `<uuid>-attachment[.<ext>]`
pub fn attachment_file_name(extension: Option<&str>) -> String {
    let uuid = Uuid::new_v4();
    match extension {
        Some(ext) => format!("{}-attachment.{}", uuid, ext),
        None => format!("{}-attachment", uuid),
    }
}
