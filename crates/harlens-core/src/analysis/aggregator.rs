use super::bounded::BoundedList;
use super::classify::{self, Bottleneck, CachingIssue, Compression, SecurityIssue};
use super::domains::{DomainStats, first_party_domain, normalize_http_version, root_domain};
use super::Analyzer;
use crate::Result;
use crate::config::ReportConfig;
use crate::format::{self, ThirdPartyCategory, WebRtcKind};
use crate::har::{Entry, Har, Phase, Timings};
use chrono::DateTime;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub index: usize,
    pub url: String,
    pub method: String,
    pub status: i64,
    pub status_text: String,
    pub time_ms: f64,
    pub mime: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlowRecord {
    pub index: usize,
    pub url: String,
    pub method: String,
    pub status: i64,
    pub time_ms: f64,
    pub wait_ms: f64,
    pub size: u64,
    pub bottleneck: Option<Bottleneck>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LargeRecord {
    pub index: usize,
    pub url: String,
    pub size: u64,
    pub mime: String,
    pub compressed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RedirectRecord {
    pub index: usize,
    pub status: i64,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebSocketSample {
    pub kind: String,
    pub time: f64,
    pub data: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebSocketRecord {
    pub index: usize,
    pub url: String,
    pub status: i64,
    pub message_count: usize,
    pub samples: Vec<WebSocketSample>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebRtcRecord {
    pub index: usize,
    pub url: String,
    pub kind: WebRtcKind,
    pub method: String,
    pub status: i64,
    pub time_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CachingRecord {
    pub index: usize,
    pub url: String,
    pub mime: String,
    pub issues: Vec<CachingIssue>,
    pub cache_control: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SecurityRecord {
    pub index: usize,
    pub url: String,
    pub domain: String,
    pub issues: Vec<SecurityIssue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CorsRecord {
    pub index: usize,
    pub url: String,
    pub domain: String,
    pub origin: String,
    pub status: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThirdPartyService {
    pub domain: String,
    pub category: ThirdPartyCategory,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsecureCookie {
    pub name: String,
    pub domain: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CompressionStats {
    pub compressed: usize,
    pub uncompressed: usize,
    pub savings: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CookieStats {
    pub sent: usize,
    pub received: usize,
    pub insecure: BoundedList<InsecureCookie>,
}

/// Summed duration of each timing phase across the capture
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimingTotals {
    pub blocked: f64,
    pub dns: f64,
    pub connect: f64,
    pub ssl: f64,
    pub send: f64,
    pub wait: f64,
    pub receive: f64,
}

impl TimingTotals {
    fn add(&mut self, timings: &Timings) {
        for phase in Phase::ALL {
            *self.slot(phase) += timings.phase(phase);
        }
    }

    fn slot(&mut self, phase: Phase) -> &mut f64 {
        match phase {
            Phase::Blocked => &mut self.blocked,
            Phase::Dns => &mut self.dns,
            Phase::Connect => &mut self.connect,
            Phase::Ssl => &mut self.ssl,
            Phase::Send => &mut self.send,
            Phase::Wait => &mut self.wait,
            Phase::Receive => &mut self.receive,
        }
    }

    pub fn get(&self, phase: Phase) -> f64 {
        match phase {
            Phase::Blocked => self.blocked,
            Phase::Dns => self.dns,
            Phase::Connect => self.connect,
            Phase::Ssl => self.ssl,
            Phase::Send => self.send,
            Phase::Wait => self.wait,
            Phase::Receive => self.receive,
        }
    }

    pub fn sum(&self) -> f64 {
        Phase::ALL.iter().map(|p| self.get(*p)).sum()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
    pub duration_ms: Option<i64>,
}

/// Everything the single pass over the entries accumulates
#[derive(Debug, Clone, Serialize)]
pub struct TrafficStats {
    pub total_requests: usize,
    pub total_time_ms: f64,
    pub total_size: u64,
    pub first_party_domain: String,
    pub time_range: Option<TimeRange>,
    pub status_codes: BTreeMap<i64, usize>,
    pub content_types: BTreeMap<String, usize>,
    pub methods: BTreeMap<String, usize>,
    pub protocols: BTreeMap<String, usize>,
    pub initiators: BTreeMap<String, usize>,
    pub domains: BTreeMap<String, DomainStats>,
    pub timings: TimingTotals,
    pub errors: BoundedList<ErrorRecord>,
    pub slow_requests: BoundedList<SlowRecord>,
    pub large_responses: BoundedList<LargeRecord>,
    pub redirects: BoundedList<RedirectRecord>,
    pub websockets: BoundedList<WebSocketRecord>,
    pub webrtc: BoundedList<WebRtcRecord>,
    pub caching_issues: BoundedList<CachingRecord>,
    pub security_issues: BoundedList<SecurityRecord>,
    pub cors_issues: BoundedList<CorsRecord>,
    /// Third-party domains in first-seen order
    pub third_party: Vec<ThirdPartyService>,
    pub compression: CompressionStats,
    pub cookies: CookieStats,
}

impl TrafficStats {
    fn new(config: &ReportConfig, first_party_domain: String) -> Self {
        let cap = config.max_collected;
        Self {
            total_requests: 0,
            total_time_ms: 0.0,
            total_size: 0,
            first_party_domain,
            time_range: None,
            status_codes: BTreeMap::new(),
            content_types: BTreeMap::new(),
            methods: BTreeMap::new(),
            protocols: BTreeMap::new(),
            initiators: BTreeMap::new(),
            domains: BTreeMap::new(),
            timings: TimingTotals::default(),
            errors: BoundedList::new(cap),
            slow_requests: BoundedList::new(cap),
            large_responses: BoundedList::new(cap),
            redirects: BoundedList::new(cap),
            websockets: BoundedList::new(cap),
            webrtc: BoundedList::new(cap),
            caching_issues: BoundedList::new(cap),
            security_issues: BoundedList::new(config.max_security_findings),
            cors_issues: BoundedList::new(cap),
            third_party: Vec::new(),
            compression: CompressionStats::default(),
            cookies: CookieStats {
                sent: 0,
                received: 0,
                insecure: BoundedList::new(cap),
            },
        }
    }

    pub fn is_third_party(&self, domain: &str) -> bool {
        !self.first_party_domain.is_empty() && domain != self.first_party_domain
    }
}

/// Single pass over the entries producing [`TrafficStats`]
pub struct EntryAggregator {
    config: ReportConfig,
}

impl EntryAggregator {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn aggregate(&self, entries: &[Entry]) -> TrafficStats {
        tracing::debug!("Aggregating {} HAR entries", entries.len());

        let first_party = first_party_domain(entries);
        let first_party_root = root_domain(&first_party);
        let mut stats = TrafficStats::new(&self.config, first_party);
        let mut seen_third_party = HashSet::new();

        for (index, entry) in entries.iter().enumerate() {
            self.add_entry(&mut stats, index, entry, &first_party_root, &mut seen_third_party);
        }

        stats.time_range = time_range(entries);

        tracing::info!(
            "Aggregation complete: {} requests, {} domains, {} errors, {} slow",
            stats.total_requests,
            stats.domains.len(),
            stats.errors.total(),
            stats.slow_requests.total()
        );

        stats
    }

    fn add_entry(
        &self,
        stats: &mut TrafficStats,
        index: usize,
        entry: &Entry,
        first_party_root: &str,
        seen_third_party: &mut HashSet<String>,
    ) {
        let url = &entry.request.url;
        let method = entry.request.method.clone();
        let status = entry.response.status;
        let time_ms = entry.elapsed();
        let size = entry.response_size();
        let mime = entry.base_mime();
        let domain = entry.host();
        let is_third_party = stats.is_third_party(&domain);

        stats.total_requests += 1;
        stats.total_time_ms += time_ms;
        stats.total_size = stats.total_size.saturating_add(size);

        *stats.methods.entry(method.clone()).or_insert(0) += 1;
        *stats.status_codes.entry(status).or_insert(0) += 1;
        *stats.content_types.entry(mime.clone()).or_insert(0) += 1;
        *stats
            .protocols
            .entry(normalize_http_version(&entry.response.http_version))
            .or_insert(0) += 1;
        *stats
            .initiators
            .entry(entry.initiator_kind().to_string())
            .or_insert(0) += 1;
        stats.timings.add(&entry.timings);

        let domain_stats = stats
            .domains
            .entry(domain.clone())
            .or_insert_with(|| DomainStats {
                domain: domain.clone(),
                count: 0,
                total_time_ms: 0.0,
                total_size: 0,
                errors: 0,
                is_third_party,
                same_site: is_third_party && root_domain(&domain) == first_party_root,
                category: is_third_party.then(|| format::categorize_third_party(&domain)),
            });
        domain_stats.count += 1;
        domain_stats.total_time_ms += time_ms;
        domain_stats.total_size = domain_stats.total_size.saturating_add(size);

        if classify::is_websocket(entry) {
            let messages = entry.websocket_messages.as_deref().unwrap_or_default();
            stats.websockets.push(WebSocketRecord {
                index,
                url: url.clone(),
                status,
                message_count: messages.len(),
                samples: messages
                    .iter()
                    .take(self.config.max_websocket_messages)
                    .map(|m| WebSocketSample {
                        kind: m.kind.clone(),
                        time: m.time,
                        data: format::clip(&m.data, 200),
                    })
                    .collect(),
            });
        }

        if classify::is_webrtc(entry) {
            stats.webrtc.push(WebRtcRecord {
                index,
                url: url.clone(),
                kind: format::webrtc_kind(url, &entry.response.content.mime_type),
                method: method.clone(),
                status,
                time_ms: format::round2(time_ms),
            });
        }

        if classify::is_error(entry) {
            domain_stats.errors += 1;
            stats.errors.push(ErrorRecord {
                index,
                url: url.clone(),
                method: method.clone(),
                status,
                status_text: entry.response.status_text.clone(),
                time_ms: format::round2(time_ms),
                mime: mime.clone(),
            });
        }

        if time_ms > self.config.slow_threshold_ms {
            stats.slow_requests.push(SlowRecord {
                index,
                url: url.clone(),
                method: method.clone(),
                status,
                time_ms: format::round2(time_ms),
                wait_ms: format::round2(entry.timings.phase(Phase::Wait)),
                size,
                bottleneck: classify::bottleneck(entry),
            });
        }

        if size > self.config.large_response_bytes() {
            stats.large_responses.push(LargeRecord {
                index,
                url: url.clone(),
                size,
                mime: mime.clone(),
                compressed: entry.has_response_header("content-encoding"),
            });
        }

        if classify::is_redirect(entry) {
            let location = match entry.response_header("location") {
                "" => entry.response.redirect_url.clone(),
                location => location.to_string(),
            };
            stats.redirects.push(RedirectRecord {
                index,
                status,
                from: url.clone(),
                to: location,
            });
        }

        let caching = classify::caching_issues(entry);
        if !caching.is_empty() {
            let cache_control = entry.response_header("cache-control");
            stats.caching_issues.push(CachingRecord {
                index,
                url: url.clone(),
                mime: mime.clone(),
                issues: caching,
                cache_control: if cache_control.is_empty() {
                    "none".to_string()
                } else {
                    format::clip(cache_control, 50)
                },
            });
        }

        let security = classify::security_issues(entry);
        if !security.is_empty() {
            stats.security_issues.push(SecurityRecord {
                index,
                url: url.clone(),
                domain: domain.clone(),
                issues: security,
            });
        }

        match classify::compression(entry) {
            Compression::Compressed { savings } => {
                stats.compression.compressed += 1;
                stats.compression.savings = stats.compression.savings.saturating_add(savings);
            }
            Compression::ShouldCompress => stats.compression.uncompressed += 1,
            Compression::NotApplicable => {}
        }

        stats.cookies.sent += entry.request.cookies.len();
        stats.cookies.received += entry.response.cookies.len();
        if entry.scheme() == "https" {
            for cookie in entry.response.cookies.iter().filter(|c| c.secure != Some(true)) {
                stats.cookies.insecure.push(InsecureCookie {
                    name: format::clip(&cookie.name, 30),
                    domain: domain.clone(),
                });
            }
        }

        if is_third_party && seen_third_party.insert(domain.clone()) {
            stats.third_party.push(ThirdPartyService {
                category: format::categorize_third_party(&domain),
                domain: domain.clone(),
            });
        }

        if let Some(origin) = classify::cors_issue(entry) {
            stats.cors_issues.push(CorsRecord {
                index,
                url: url.clone(),
                domain,
                origin,
                status,
            });
        }
    }
}

impl Analyzer for EntryAggregator {
    type Output = TrafficStats;

    fn analyze(&self, har: &Har) -> Result<Self::Output> {
        Ok(self.aggregate(&har.log.entries))
    }
}

/// Earliest and latest `startedDateTime`; unparsable timestamps are ignored
fn time_range(entries: &[Entry]) -> Option<TimeRange> {
    let mut stamps: Vec<_> = entries
        .iter()
        .filter_map(|e| {
            DateTime::parse_from_rfc3339(&e.started_date_time)
                .ok()
                .map(|dt| (dt, e.started_date_time.as_str()))
        })
        .collect();

    if stamps.is_empty() {
        let first = entries.first()?.started_date_time.clone();
        let last = entries.last()?.started_date_time.clone();
        if first.is_empty() {
            return None;
        }
        return Some(TimeRange {
            start: first,
            end: last,
            duration_ms: None,
        });
    }

    stamps.sort_by_key(|(dt, _)| *dt);
    let (start, start_raw) = stamps.first()?;
    let (end, end_raw) = stamps.last()?;
    Some(TimeRange {
        start: start_raw.to_string(),
        end: end_raw.to_string(),
        duration_ms: Some((*end - *start).num_milliseconds()),
    })
}
