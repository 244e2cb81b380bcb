use super::{cell, omitted};
use crate::context::ReportContext;
use harlens_core::har::Entry;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

const MUTATING_METHODS: &[&str] = &["POST", "PUT", "PATCH", "DELETE"];
const UUID_MIN_HEX: usize = 32;

/// Calls grouped under one inferred route
#[derive(Debug, Clone, Serialize)]
pub struct EndpointTemplate {
    pub domain: String,
    pub path: String,
    pub methods: BTreeSet<String>,
    pub statuses: BTreeSet<i64>,
    pub count: usize,
}

/// Replace identifier-like path segments with placeholders
///
/// All-digit segments become `{id}`; segments holding 32 or more hex
/// characters once dashes are removed become `{uuid}`.
pub fn template_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()) {
                "{id}"
            } else if is_hex_identifier(segment) {
                "{uuid}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn is_hex_identifier(segment: &str) -> bool {
    let compact: Vec<char> = segment.chars().filter(|c| *c != '-').collect();
    compact.len() >= UUID_MIN_HEX && compact.iter().all(|c| c.is_ascii_hexdigit())
}

fn is_api_call(entry: &Entry) -> bool {
    let mime = entry.base_mime();
    mime.contains("json")
        || MUTATING_METHODS
            .iter()
            .any(|m| entry.request.method.eq_ignore_ascii_case(m))
}

/// Endpoint templates by call count descending, ties by domain and path
pub fn infer_endpoints(entries: &[Entry]) -> Vec<EndpointTemplate> {
    let mut endpoints: Vec<EndpointTemplate> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for entry in entries.iter().filter(|e| is_api_call(e)) {
        let domain = entry.host();
        let path = template_path(&entry.path());
        let at = *index
            .entry((domain.clone(), path.clone()))
            .or_insert_with(|| {
                endpoints.push(EndpointTemplate {
                    domain,
                    path,
                    methods: BTreeSet::new(),
                    statuses: BTreeSet::new(),
                    count: 0,
                });
                endpoints.len() - 1
            });

        let endpoint = &mut endpoints[at];
        endpoint.methods.insert(entry.request.method.to_uppercase());
        endpoint.statuses.insert(entry.response.status);
        endpoint.count += 1;
    }

    endpoints.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.domain.cmp(&b.domain))
            .then_with(|| a.path.cmp(&b.path))
    });
    endpoints
}

pub(super) fn build(ctx: &ReportContext) -> Vec<String> {
    let endpoints = infer_endpoints(ctx.entries);
    if endpoints.is_empty() {
        return Vec::new();
    }

    let mut lines = vec![
        format!("## API Surface ({} endpoints)", endpoints.len()),
        String::new(),
        "| Methods | Endpoint | Status | Calls |".to_string(),
        "|---------|----------|--------|-------|".to_string(),
    ];

    let limit = ctx.config.max_api_endpoints;
    for endpoint in endpoints.iter().take(limit) {
        let methods: Vec<&str> = endpoint.methods.iter().map(String::as_str).collect();
        let statuses: Vec<String> = endpoint.statuses.iter().map(|s| s.to_string()).collect();
        lines.push(format!(
            "| {} | {}{} | {} | {} |",
            methods.join(", "),
            cell(&endpoint.domain),
            cell(&endpoint.path),
            statuses.join(", "),
            endpoint.count
        ));
    }

    if let Some(note) = omitted(endpoints.len().saturating_sub(limit), "endpoints") {
        lines.push(note);
    }

    lines
}
