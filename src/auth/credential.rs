//! Account credentials and the session they produce.

use std::fmt;
use std::str::FromStr;

/// DSM application the session is scoped to. Sent as the login `session` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceType {
    #[default]
    SynologyDrive,
    SynologySpreadsheet,
}

impl ServiceType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SynologyDrive => "SynologyDrive",
            Self::SynologySpreadsheet => "SynologySpreadsheet",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SynologyDrive" => Ok(Self::SynologyDrive),
            "SynologySpreadsheet" => Ok(Self::SynologySpreadsheet),
            other => Err(format!(
                "unknown service type '{other}' (expected SynologyDrive or SynologySpreadsheet)"
            )),
        }
    }
}

/// Session issued by a successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    sid: String,
    did: String,
}

impl Session {
    #[must_use]
    pub fn new(sid: impl Into<String>, did: impl Into<String>) -> Self {
        Self {
            sid: sid.into(),
            did: did.into(),
        }
    }

    /// Session id. Sensitive, avoid logging.
    #[must_use]
    pub fn sid(&self) -> &str {
        &self.sid
    }

    /// Device id.
    #[must_use]
    pub fn did(&self) -> &str {
        &self.did
    }

    /// Value for the `Cookie` header on authenticated requests.
    #[must_use]
    pub fn cookie_header(&self) -> String {
        format!("id={}", self.sid)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("sid", &"[REDACTED]")
            .field("did", &self.did)
            .finish()
    }
}

/// Login material for one NAS account.
///
/// The password is redacted from Debug output.
#[derive(Clone)]
pub struct Credential {
    /// NAS base URL, e.g. `https://192.168.1.100:5001`.
    pub base_url: String,
    pub username: String,
    password: String,
    pub service_type: ServiceType,
    /// Skip TLS certificate validation for this NAS.
    pub allow_self_signed: bool,
    session: Option<Session>,
}

impl Credential {
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            service_type: ServiceType::default(),
            allow_self_signed: true,
            session: None,
        }
    }

    #[must_use]
    pub fn with_service_type(mut self, service_type: ServiceType) -> Self {
        self.service_type = service_type;
        self
    }

    #[must_use]
    pub fn with_allow_self_signed(mut self, allow: bool) -> Self {
        self.allow_self_signed = allow;
        self
    }

    /// Password. Never log the return value.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Current session, if [`authenticate`](super::authenticate) succeeded.
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn set_session(&mut self, session: Session) {
        self.session = Some(session);
    }

    /// Drops the session, returning the credential to the unauthenticated state.
    pub fn clear_session(&mut self) -> Option<Session> {
        self.session.take()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("service_type", &self.service_type)
            .field("allow_self_signed", &self.allow_self_signed)
            .field("session", &self.session)
            .finish()
    }
}
