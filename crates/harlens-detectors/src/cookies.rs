use harlens_core::har::{Cookie, Entry};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// One cookie name and every domain it was sent to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieFanOut {
    pub name: String,
    pub domains: Vec<String>,
    pub request_count: usize,
    /// Every request carried the same value
    pub same_value: bool,
}

impl CookieFanOut {
    /// Same name sent to two or more domains; a tracking indicator
    pub fn is_cross_domain(&self) -> bool {
        self.domains.len() >= 2
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CookieFlag {
    NoSecure,
    NoHttpOnly,
    NoSameSite,
    SameSiteNone,
}

impl fmt::Display for CookieFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CookieFlag::NoSecure => "no Secure",
            CookieFlag::NoHttpOnly => "no HttpOnly",
            CookieFlag::NoSameSite => "no SameSite",
            CookieFlag::SameSiteNone => "SameSite=None",
        };
        f.write_str(label)
    }
}

/// Security attributes of one `Set-Cookie`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetCookieAudit {
    pub name: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<String>,
}

impl SetCookieAudit {
    /// Parse a raw `Set-Cookie` header value
    pub fn parse(header_value: &str) -> Option<Self> {
        let mut parts = header_value.split(';');
        let (name, _) = parts.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut audit = SetCookieAudit {
            name: name.to_string(),
            secure: false,
            http_only: false,
            same_site: None,
        };

        for attr in parts {
            let (key, value) = match attr.split_once('=') {
                Some((k, v)) => (k.trim(), v.trim()),
                None => (attr.trim(), ""),
            };
            if key.eq_ignore_ascii_case("secure") {
                audit.secure = true;
            } else if key.eq_ignore_ascii_case("httponly") {
                audit.http_only = true;
            } else if key.eq_ignore_ascii_case("samesite") {
                audit.same_site = Some(value.to_string());
            }
        }

        Some(audit)
    }

    fn from_cookie(cookie: &Cookie) -> Self {
        Self {
            name: cookie.name.clone(),
            secure: cookie.secure == Some(true),
            http_only: cookie.http_only == Some(true),
            same_site: cookie.same_site.clone(),
        }
    }

    pub fn flags(&self) -> Vec<CookieFlag> {
        let mut flags = Vec::new();
        if !self.secure {
            flags.push(CookieFlag::NoSecure);
        }
        if !self.http_only {
            flags.push(CookieFlag::NoHttpOnly);
        }
        match self.same_site.as_deref() {
            None | Some("") => flags.push(CookieFlag::NoSameSite),
            Some(value) if value.eq_ignore_ascii_case("none") => {
                flags.push(CookieFlag::SameSiteNone)
            }
            Some(_) => {}
        }
        flags
    }
}

/// Cookie usage across a capture
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CookieReport {
    /// Sorted by number of domains, then name
    pub fan_out: Vec<CookieFanOut>,
    /// Domain -> cookies it sets, first definition per name wins
    pub set_cookies: BTreeMap<String, Vec<SetCookieAudit>>,
}

impl CookieReport {
    pub fn cross_domain(&self) -> impl Iterator<Item = &CookieFanOut> {
        self.fan_out.iter().filter(|c| c.is_cross_domain())
    }
}

pub struct CookieTracker;

impl CookieTracker {
    pub fn track(entries: &[Entry]) -> CookieReport {
        // name -> (domains, request count, first value, all values equal)
        let mut sent: BTreeMap<String, (BTreeSet<String>, usize, String, bool)> = BTreeMap::new();
        let mut set_cookies: BTreeMap<String, Vec<SetCookieAudit>> = BTreeMap::new();

        for entry in entries {
            let domain = entry.host();

            for (name, value) in Self::request_cookies(entry) {
                let slot = sent
                    .entry(name)
                    .or_insert_with(|| (BTreeSet::new(), 0, value.clone(), true));
                slot.0.insert(domain.clone());
                slot.1 += 1;
                if slot.2 != value {
                    slot.3 = false;
                }
            }

            let audits = Self::response_cookies(entry);
            if audits.is_empty() {
                continue;
            }
            let known = set_cookies.entry(domain).or_default();
            for audit in audits {
                if !known.iter().any(|k| k.name == audit.name) {
                    known.push(audit);
                }
            }
        }

        let mut fan_out: Vec<CookieFanOut> = sent
            .into_iter()
            .map(|(name, (domains, request_count, _, same_value))| CookieFanOut {
                name,
                domains: domains.into_iter().collect(),
                request_count,
                same_value,
            })
            .collect();
        fan_out.sort_by(|a, b| {
            b.domains
                .len()
                .cmp(&a.domains.len())
                .then_with(|| a.name.cmp(&b.name))
        });

        tracing::debug!(
            "Tracked {} cookie names, {} setting domains",
            fan_out.len(),
            set_cookies.len()
        );

        CookieReport {
            fan_out,
            set_cookies,
        }
    }

    /// Cookies from the HAR `cookies` array, or the raw `Cookie` header when
    /// the exporter left the array empty
    fn request_cookies(entry: &Entry) -> Vec<(String, String)> {
        if !entry.request.cookies.is_empty() {
            return entry
                .request
                .cookies
                .iter()
                .filter(|c| !c.name.is_empty())
                .map(|c| (c.name.clone(), c.value.clone()))
                .collect();
        }

        entry
            .request_header("cookie")
            .split(';')
            .filter_map(|pair| pair.split_once('='))
            .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
            .filter(|(name, _)| !name.is_empty())
            .collect()
    }

    fn response_cookies(entry: &Entry) -> Vec<SetCookieAudit> {
        let from_headers: Vec<SetCookieAudit> = entry
            .response_header_values("set-cookie")
            .flat_map(|value| value.lines())
            .filter_map(SetCookieAudit::parse)
            .collect();
        if !from_headers.is_empty() {
            return from_headers;
        }

        entry
            .response
            .cookies
            .iter()
            .filter(|c| !c.name.is_empty())
            .map(SetCookieAudit::from_cookie)
            .collect()
    }
}
