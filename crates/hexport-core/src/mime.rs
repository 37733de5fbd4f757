//! Extension to mime type mapping for static files

/// Mime type used when the extension is unknown.
pub const DEFAULT_MIME_TYPE: &str = "application/javascript";

const MIME_TABLE: &[(&str, &str)] = &[
    ("css", "text/css"),
    ("js", "application/javascript"),
    ("mjs", "application/javascript"),
    ("json", "application/json"),
    ("map", "application/json"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("txt", "text/plain"),
    ("xml", "application/xml"),
    ("svg", "image/svg+xml"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("ico", "image/x-icon"),
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("ttf", "font/ttf"),
];

/// Infer the mime type from the extension of a logical name (case-insensitive).
pub fn mime_type_for(logical_name: &str) -> &'static str {
    let file_name = logical_name.rsplit('/').next().unwrap_or(logical_name);

    let Some((_, ext)) = file_name.rsplit_once('.') else {
        return DEFAULT_MIME_TYPE;
    };

    MIME_TABLE
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(ext))
        .map(|(_, mime)| *mime)
        .unwrap_or(DEFAULT_MIME_TYPE)
}
