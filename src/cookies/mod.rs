//! Cookie value objects and collections.
//!
//! - [`Cookie`](cookie::Cookie): a single cookie with its attributes and
//!   the exact `Set-Cookie` wire serialization.
//! - [`CookieCollection`](jar::CookieCollection): a name-keyed jar with
//!   copy-on-write variants and request-header ingestion.

pub mod cookie;
pub mod jar;

pub use cookie::{Cookie, SameSite};
pub use jar::CookieCollection;
