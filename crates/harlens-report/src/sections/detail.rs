use super::omitted;
use crate::context::ReportContext;
use harlens_core::ReportConfig;
use harlens_core::analysis::classify;
use harlens_core::filter::{self, HostPattern};
use harlens_core::format;
use harlens_core::har::{Cookie, Entry, Header};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

const PRIORITY_SCORE: i64 = -1000;
const ERROR_SCORE: i64 = -100;
const SLOW_SCORE: i64 = -50;
const SCRIPT_OR_PAGE_SCORE: i64 = -10;
const JSON_SCORE: i64 = -5;

const MAX_COOKIE_VALUE_CHARS: usize = 60;

/// Rendering priority of an entry; lower renders first
pub fn detail_score(entry: &Entry, config: &ReportConfig, priority: &[HostPattern]) -> i64 {
    let mime = entry.base_mime();
    let mut score = 0;
    if filter::matches_any(priority, &entry.host()) {
        score += PRIORITY_SCORE;
    }
    if classify::is_error(entry) {
        score += ERROR_SCORE;
    }
    if entry.elapsed() > config.slow_threshold_ms {
        score += SLOW_SCORE;
    }
    if mime.contains("javascript") || mime.contains("html") {
        score += SCRIPT_OR_PAGE_SCORE;
    }
    if mime.contains("json") {
        score += JSON_SCORE;
    }
    score
}

/// Indices of the entries to render in full, best score first, capture order
/// among equal scores
pub fn select_detailed(entries: &[Entry], config: &ReportConfig) -> Vec<usize> {
    let priority = config.priority_patterns();
    let mut scored: Vec<(i64, usize)> = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| (detail_score(entry, config, &priority), index))
        .collect();
    scored.sort_by_key(|(score, _)| *score);
    scored
        .into_iter()
        .take(config.max_detailed_entries)
        .map(|(_, index)| index)
        .collect()
}

pub(super) fn build(ctx: &ReportContext) -> Vec<String> {
    let limit = ctx.config.max_detailed_entries;
    if limit == 0 || ctx.entries.is_empty() {
        return Vec::new();
    }

    let selected = select_detailed(ctx.entries, ctx.config);
    tracing::debug!(
        "Rendering {} of {} entries in detail",
        selected.len(),
        ctx.entries.len()
    );

    let mut lines = vec![format!(
        "## Detailed Entries (showing {} of {})",
        selected.len(),
        ctx.entries.len()
    )];

    for (rank, index) in selected.iter().enumerate() {
        lines.push(String::new());
        render_entry(ctx, rank + 1, &ctx.entries[*index], &mut lines);
    }

    if let Some(note) = omitted(ctx.entries.len() - selected.len(), "entries not shown in detail") {
        lines.push(String::new());
        lines.push(note);
    }

    lines
}

fn render_entry(ctx: &ReportContext, rank: usize, entry: &Entry, lines: &mut Vec<String>) {
    let config = ctx.config;
    let response = &entry.response;

    lines.push(format!(
        "### {}. {} {}",
        rank, entry.request.method, entry.request.url
    ));
    lines.push(format!(
        "- Status: {} {} | Time: {}ms | Size: {} | Type: {}",
        response.status,
        response.status_text,
        format::trim_float(format::round2(entry.elapsed())),
        format::format_size(entry.response_size()),
        entry.base_mime()
    ));

    if config.include_headers {
        push_headers("Request headers", &entry.request.headers, lines);
        push_headers("Response headers", &response.headers, lines);
    }

    if config.include_cookies {
        push_cookies("Request cookies", &entry.request.cookies, lines);
        push_cookies("Response cookies", &response.cookies, lines);
    }

    if !entry.request.query_string.is_empty() {
        lines.push("**Query parameters:**".to_string());
        for param in &entry.request.query_string {
            lines.push(format!("- {} = {}", param.name, param.value));
        }
    }

    if let Some(post) = &entry.request.post_data {
        lines.push(format!("**Request body** ({}):", post.mime_type));
        if !post.params.is_empty() {
            for param in &post.params {
                match &param.file_name {
                    Some(file) if !file.is_empty() => {
                        lines.push(format!("- {} = [file: {}]", param.name, file))
                    }
                    _ => lines.push(format!(
                        "- {} = {}",
                        param.name,
                        param.value.as_deref().unwrap_or("")
                    )),
                }
            }
        } else if config.include_bodies
            && let Some(text) = post.text.as_deref().filter(|t| !t.is_empty())
        {
            push_code_block(text, config.max_body_chars, lines);
        }
    }

    if config.include_bodies
        && let Some(body) = response.content.text.as_deref().filter(|t| !t.is_empty())
    {
        if is_binary(entry) {
            lines.push(format!(
                "**Response body:** [binary body: {}, hash {:016x}]",
                format::format_size(entry.response_size()),
                body_hash(body)
            ));
        } else {
            lines.push("**Response body:**".to_string());
            push_code_block(body, config.max_body_chars, lines);
        }
    }

    if let Some(messages) = &entry.websocket_messages
        && !messages.is_empty()
    {
        lines.push(format!("**WebSocket messages** ({}):", messages.len()));
        for message in messages.iter().take(config.max_websocket_messages) {
            lines.push(format!(
                "- [{}] {}",
                message.kind,
                format::truncate(&message.data.replace('\n', " "), 200)
            ));
        }
        if let Some(note) = omitted(
            messages.len().saturating_sub(config.max_websocket_messages),
            "messages",
        ) {
            lines.push(note);
        }
    }
}

fn push_headers(title: &str, headers: &[Header], lines: &mut Vec<String>) {
    if headers.is_empty() {
        return;
    }
    lines.push(format!("**{}:**", title));
    for header in headers {
        lines.push(format!("- {}: {}", header.name, header.value));
    }
}

fn push_cookies(title: &str, cookies: &[Cookie], lines: &mut Vec<String>) {
    if cookies.is_empty() {
        return;
    }
    lines.push(format!("**{}:**", title));
    for cookie in cookies {
        lines.push(format!(
            "- {} = {}",
            cookie.name,
            format::truncate(&cookie.value, MAX_COOKIE_VALUE_CHARS)
        ));
    }
}

fn push_code_block(text: &str, max_chars: usize, lines: &mut Vec<String>) {
    let length = text.chars().count();
    lines.push("```".to_string());
    lines.push(format::clip(text, max_chars));
    lines.push("```".to_string());
    if length > max_chars {
        lines.push(format!("_({} more characters)_", length - max_chars));
    }
}

/// Base64 payloads and non-text MIME types are not inlined
fn is_binary(entry: &Entry) -> bool {
    if entry
        .response
        .content
        .encoding
        .as_deref()
        .is_some_and(|e| e.eq_ignore_ascii_case("base64"))
    {
        return true;
    }
    let mime = entry.base_mime();
    !(mime == "unknown"
        || mime.starts_with("text/")
        || mime.contains("json")
        || mime.contains("xml")
        || mime.contains("javascript")
        || mime.contains("x-www-form-urlencoded"))
}

fn body_hash(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}
