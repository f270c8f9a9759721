/// Attachment suffixes whose text is forwarded to the model.
pub const SUPPORTED_ATTACHMENT_EXTENSIONS: [&str; 2] = [".txt", ".md"];

/// Removes Markdown code-fence markers the model wraps JSON in.
///
/// Every "```json" and every remaining "```" is removed wherever it appears,
/// then surrounding whitespace is trimmed.
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// Whether an uploaded file should be read as prompt context. Case-sensitive.
pub fn is_supported_attachment(filename: &str) -> bool {
    SUPPORTED_ATTACHMENT_EXTENSIONS
        .iter()
        .any(|ext| filename.ends_with(ext))
}
