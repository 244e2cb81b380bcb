use super::{cell, omitted};
use crate::context::ReportContext;
use harlens_core::format;

const MAX_SESSIONS_SHOWN: usize = 10;
const MAX_SAMPLES_SHOWN: usize = 5;
const MAX_WEBRTC_ROWS: usize = 15;

pub(super) fn build(ctx: &ReportContext) -> Vec<String> {
    let websockets = &ctx.stats.websockets;
    let webrtc = &ctx.stats.webrtc;
    if websockets.is_empty() && webrtc.is_empty() {
        return Vec::new();
    }

    let mut lines = vec!["## Real-Time Communication".to_string()];

    if !websockets.is_empty() {
        lines.push(String::new());
        lines.push(format!("### WebSocket Connections ({})", websockets.total()));
        let shown = websockets.len().min(MAX_SESSIONS_SHOWN);
        for session in websockets.iter().take(shown) {
            lines.push(format!(
                "- `{}` (status {}, {} messages)",
                format::truncate(&session.url, 120),
                session.status,
                session.message_count
            ));
            for sample in session.samples.iter().take(MAX_SAMPLES_SHOWN) {
                lines.push(format!(
                    "  - [{}] {}",
                    sample.kind,
                    format::truncate(&sample.data.replace('\n', " "), 100)
                ));
            }
        }
        if let Some(note) = omitted(
            websockets.total().saturating_sub(shown),
            "WebSocket connections",
        ) {
            lines.push(note);
        }
    }

    if !webrtc.is_empty() {
        lines.push(String::new());
        lines.push(format!("### WebRTC Activity ({})", webrtc.total()));
        lines.push("| Type | Method | Status | Time | URL |".to_string());
        lines.push("|------|--------|--------|------|-----|".to_string());
        let shown = webrtc.len().min(MAX_WEBRTC_ROWS);
        for record in webrtc.iter().take(shown) {
            lines.push(format!(
                "| {} | {} | {} | {}ms | {} |",
                record.kind.as_str(),
                record.method,
                record.status,
                format::trim_float(record.time_ms),
                cell(&format::truncate(&record.url, 100))
            ));
        }
        if let Some(note) = omitted(
            webrtc.total().saturating_sub(shown),
            "WebRTC requests",
        ) {
            lines.push(note);
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use crate::context::{ReportContext, ReportMode};
    use crate::sections::Section;
    use harlens_core::ReportConfig;
    use harlens_core::analysis::EntryAggregator;
    use harlens_core::har::{Entry, Request, Response, WebSocketMessage};

    fn entry(url: &str, status: i64) -> Entry {
        Entry {
            time: 12.0,
            request: Request {
                method: "GET".to_string(),
                url: url.to_string(),
                ..Default::default()
            },
            response: Response {
                status,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn render(entries: &[Entry]) -> String {
        let config = ReportConfig::summary();
        let stats = EntryAggregator::new(config.clone()).aggregate(entries);
        let ctx = ReportContext {
            entries,
            stats: &stats,
            config: &config,
            mode: ReportMode::Summary,
        };
        Section::Realtime.build(&ctx)
    }

    #[test]
    fn test_websocket_samples_limited() {
        let mut ws = entry("wss://live.example.com/socket", 101);
        ws.websocket_messages = Some(
            (0..8)
                .map(|i| WebSocketMessage {
                    kind: "receive".to_string(),
                    time: i as f64,
                    data: format!("tick {}", i),
                    ..Default::default()
                })
                .collect(),
        );
        let text = render(&[ws]);
        assert!(text.contains("### WebSocket Connections (1)"));
        assert!(text.contains("(status 101, 8 messages)"));
        assert!(text.contains("  - [receive] tick 4"));
        assert!(!text.contains("tick 5"));
    }

    #[test]
    fn test_webrtc_table() {
        let text = render(&[entry("https://turn.example.com/webrtc/credentials", 200)]);
        assert!(text.contains("### WebRTC Activity (1)"));
        assert!(text.contains("| TURN | GET | 200 | 12ms | https://turn.example.com/webrtc/credentials |"));
    }

    #[test]
    fn test_nothing_realtime() {
        assert!(render(&[entry("https://example.com/", 200)]).is_empty());
    }
}
