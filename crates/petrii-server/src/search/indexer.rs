//! Content indexer

/// Metadata and content that make up a dataset's indexed text
#[derive(Debug, Clone, Copy)]
pub struct IndexFields<'a> {
    pub title: &'a str,
    pub author: &'a str,
    pub experiment_type: &'a str,
    pub tags: &'a [String],
    pub content: Option<&'a str>,
}

/// Best-effort text extraction from an uploaded file.
///
/// Returns `None` for anything that is not valid UTF-8. A leading byte-order
/// mark and NUL characters are dropped since text columns cannot hold NUL.
pub fn decode_content(bytes: &[u8]) -> Option<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) if text.contains('\0') => Some(text.replace('\0', "")),
        Ok(text) => Some(text.to_string()),
        Err(e) => {
            tracing::warn!(
                valid_up_to = e.valid_up_to(),
                "Upload is not UTF-8 text; indexing metadata only"
            );
            None
        },
    }
}

/// Join every searchable field into one lowercased string.
pub fn build_indexed_text(fields: IndexFields<'_>) -> String {
    let mut parts: Vec<&str> = vec![fields.title, fields.author, fields.experiment_type];
    parts.extend(fields.tags.iter().map(String::as_str));
    if let Some(content) = fields.content {
        parts.push(content);
    }

    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .to_lowercase()
}
