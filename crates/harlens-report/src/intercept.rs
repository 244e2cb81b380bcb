//! Chat message rewriting.
//!
//! A chat front end hands every inbound request body to [`Interceptor::inlet`]
//! before the model sees it. When the latest user message carries a `.har`
//! attachment (or is itself a pasted capture), its content is replaced by the
//! user's question followed by the forensic report, and the attachment is
//! dropped so the raw capture never reaches the model.

use crate::{ReportMode, analyze_with};
use harlens_core::ReportConfig;
use harlens_core::har::HarReader;
use serde_json::Value;

/// Question used when the user sent nothing but the capture
pub const DEFAULT_INSTRUCTION: &str =
    "Analyze this HAR capture and summarize the notable findings.";

const NAME_POINTERS: &[&str] = &["/name", "/filename", "/file/filename", "/file/meta/name"];
const CONTENT_POINTERS: &[&str] = &["/content", "/data/content", "/file/data/content"];

/// Where a matched attachment lives in the request body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttachmentSource {
    Message,
    Body,
}

#[derive(Debug)]
struct Attachment {
    source: AttachmentSource,
    position: usize,
    name: String,
    content: String,
}

pub struct Interceptor {
    config: ReportConfig,
}

impl Default for Interceptor {
    fn default() -> Self {
        Self::new(ReportConfig::forensic())
    }
}

impl Interceptor {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Rewrite an inbound chat body; bodies without a capture come back as-is
    pub async fn inlet(&self, body: Value, user: Option<&Value>) -> Value {
        if let Some(id) = user.and_then(|u| u.get("id")).and_then(Value::as_str) {
            tracing::debug!("Inspecting chat message from user {}", id);
        }
        self.rewrite(body)
    }

    pub fn rewrite(&self, mut body: Value) -> Value {
        let Some(index) = last_user_message(&body) else {
            return body;
        };

        let message = &body["messages"][index];
        let question = message_text(&message["content"]);

        let (attachment_name, report) = match find_attachment(message, &body) {
            Some(attachment) => {
                tracing::info!("Replacing attachment {} with its HAR report", attachment.name);
                let report = self.report(&attachment.content);
                remove_attachment(&mut body, index, &attachment);
                (attachment.name, report)
            }
            None if HarReader::looks_like_har(&question) => {
                tracing::info!("Replacing inline HAR capture with its report");
                ("inline capture".to_string(), self.report(&question))
            }
            None => return body,
        };

        let question = if HarReader::looks_like_har(&question) || question.trim().is_empty() {
            DEFAULT_INSTRUCTION.to_string()
        } else {
            question
        };

        body["messages"][index]["content"] = Value::String(format!(
            "{}\n\n### HAR analysis of {}\n\n{}",
            question, attachment_name, report
        ));
        body
    }

    fn report(&self, capture: &str) -> String {
        analyze_with(capture, ReportMode::Forensic, &self.config)
    }
}

fn last_user_message(body: &Value) -> Option<usize> {
    body.get("messages")?
        .as_array()?
        .iter()
        .rposition(|m| m.get("role").and_then(Value::as_str) == Some("user"))
}

/// String content, or the `text` parts of a multi-part content array
fn message_text(content: &Value) -> String {
    match content {
        Value::String(text) => text.clone(),
        Value::Array(parts) => parts
            .iter()
            .filter(|p| p.get("type").and_then(Value::as_str) == Some("text"))
            .filter_map(|p| p.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

fn first_str<'a>(value: &'a Value, pointers: &[&str]) -> Option<&'a str> {
    pointers
        .iter()
        .find_map(|p| value.pointer(p).and_then(Value::as_str))
}

fn har_in(files: Option<&Value>, source: AttachmentSource) -> Option<Attachment> {
    files?
        .as_array()?
        .iter()
        .enumerate()
        .find_map(|(position, file)| {
            let name = first_str(file, NAME_POINTERS)?;
            if !name.to_lowercase().ends_with(".har") {
                return None;
            }
            let content = first_str(file, CONTENT_POINTERS)?;
            Some(Attachment {
                source,
                position,
                name: name.to_string(),
                content: content.to_string(),
            })
        })
}

/// The message's own files win over the body-level files
fn find_attachment(message: &Value, body: &Value) -> Option<Attachment> {
    har_in(message.get("files"), AttachmentSource::Message)
        .or_else(|| har_in(body.get("files"), AttachmentSource::Body))
}

fn remove_attachment(body: &mut Value, index: usize, attachment: &Attachment) {
    let files = match attachment.source {
        AttachmentSource::Message => body["messages"][index].get_mut("files"),
        AttachmentSource::Body => body.get_mut("files"),
    };
    if let Some(files) = files.and_then(Value::as_array_mut)
        && attachment.position < files.len()
    {
        files.remove(attachment.position);
    }
}
