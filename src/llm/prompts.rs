// Prompt text for the ad-generation request

use crate::llm::types::{AdPrompt, AdRequest, Content, Part};
use crate::utils::is_supported_attachment;
use log::{debug, warn};
use std::io::ErrorKind;
use std::path::Path;

pub const SYSTEM_INSTRUCTION: &str = r#"
You are a marketing specialist and copywriter. Keep style professional.
You will have access to ad formats guidelines, which you must follow.
"#;

pub fn ad_instructions(request: &AdRequest, schema: &str) -> String {
    format!(
        r#"
<SCHEMA>
{schema}
</SCHEMA>
Strictly follow the "Guide to ad formats". generate on {platforms} ad by following json SCHEMA for {product} based on the following prompt: {chat_input}. If guide says it has many headlines, descriptions, body texts and so on, generate maximum allowed amount according to guide.
"#,
        schema = schema,
        platforms = request.platforms.join(", "),
        product = request.product,
        chat_input = request.chat_input,
    )
}

pub fn attachment_context(filename: &str, content: &str) -> String {
    format!(
        "Additional context from attached file '{}':\n{}",
        filename, content
    )
}

/// Assembles the user message: guide, instructions, then supported attachments.
pub fn build_ad_prompt(request: &AdRequest, schema: &str, guide: Option<&str>) -> AdPrompt {
    let mut parts = Vec::new();

    if let Some(guide) = guide.filter(|g| !g.is_empty()) {
        parts.push(Part::text(guide));
    }

    parts.push(Part::text(ad_instructions(request, schema)));

    for attachment in &request.attachments {
        if is_supported_attachment(&attachment.filename) {
            let content = String::from_utf8_lossy(&attachment.content);
            parts.push(Part::text(attachment_context(&attachment.filename, &content)));
        } else {
            warn!(
                "Ignoring attached file '{}'. Only text files (.txt) and Markdown files (.md) are supported.",
                attachment.filename
            );
        }
    }

    debug!("Built ad prompt with {} parts", parts.len());

    AdPrompt {
        system_instruction: SYSTEM_INSTRUCTION.to_string(),
        contents: vec![Content::user(parts)],
    }
}

/// Reads the ad-format guide. A missing or unreadable guide is not fatal.
pub async fn load_guide(path: &Path) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Some(text),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(
                "Guide {} not found. Ad generation may be less specific.",
                path.display()
            );
            None
        }
        Err(e) => {
            warn!("Could not read guide {}: {}", path.display(), e);
            None
        }
    }
}
