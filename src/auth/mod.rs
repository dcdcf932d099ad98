//! DSM session authentication.
//!
//! A [`Credential`] starts unauthenticated. [`authenticate`] performs one
//! login round trip and returns a [`Session`]; the caller attaches it to the
//! credential and every later request carries `Cookie: id=<sid>`. Nothing here
//! refreshes or retries: a rejected session means calling [`authenticate`]
//! again.

mod credential;
mod error;
mod session;

pub use credential::{Credential, ServiceType, Session};
pub use error::AuthError;
pub use session::{authenticate, login_url, logout, logout_url};
