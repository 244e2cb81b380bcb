mod aggregator;
mod bounded;
pub mod classify;
mod domains;

pub use aggregator::{
    CachingRecord, CompressionStats, CookieStats, CorsRecord, EntryAggregator, ErrorRecord,
    InsecureCookie, LargeRecord, RedirectRecord, SecurityRecord, SlowRecord, ThirdPartyService,
    TimeRange, TimingTotals, TrafficStats, WebRtcRecord, WebSocketRecord, WebSocketSample,
};
pub use bounded::BoundedList;
pub use domains::{DomainStats, first_party_domain, normalize_http_version, root_domain};

use crate::har::Har;

pub trait Analyzer {
    type Output;

    fn analyze(&self, har: &Har) -> crate::Result<Self::Output>;
}
