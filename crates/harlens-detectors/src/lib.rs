pub mod cookies;
pub mod error;
pub mod jwt;

pub use cookies::{CookieFanOut, CookieFlag, CookieReport, CookieTracker, SetCookieAudit};
pub use error::{Error, Result};
pub use jwt::{BearerJwt, JwtHeader, JwtInspector};
