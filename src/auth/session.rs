//! Login and logout against `SYNO.API.Auth`.

use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::credential::{Credential, Session};
use super::error::AuthError;
use crate::constants::{AUTH_API_NAME, AUTH_API_VERSION, AUTH_CGI_PATH};
use crate::transport::{HttpMethod, PreparedRequest, Transport, endpoint_url, redact_url};

#[derive(Debug, Deserialize)]
struct AuthEnvelope {
    success: bool,
    #[serde(default)]
    data: Option<LoginData>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    sid: String,
    #[serde(default)]
    did: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: i64,
}

impl AuthEnvelope {
    fn error_code(&self) -> i64 {
        self.error.as_ref().map_or(0, |e| e.code)
    }
}

fn auth_url(credential: &Credential, method: &str) -> Result<Url, AuthError> {
    let mut url = endpoint_url(&credential.base_url, AUTH_CGI_PATH)
        .ok_or_else(|| AuthError::invalid_url(credential.base_url.clone()))?;
    url.query_pairs_mut()
        .append_pair("api", AUTH_API_NAME)
        .append_pair("method", method)
        .append_pair("version", AUTH_API_VERSION);
    Ok(url)
}

/// Builds the login URL: account, password, service session token, `format=sid`.
///
/// # Errors
///
/// Returns [`AuthError::InvalidUrl`] when the credential's base URL is unusable.
pub fn login_url(credential: &Credential) -> Result<Url, AuthError> {
    let mut url = auth_url(credential, "login")?;
    url.query_pairs_mut()
        .append_pair("account", &credential.username)
        .append_pair("passwd", credential.password())
        .append_pair("session", credential.service_type.as_str())
        .append_pair("format", "sid");
    Ok(url)
}

/// Builds the logout URL for the credential's service session.
///
/// # Errors
///
/// Returns [`AuthError::InvalidUrl`] when the credential's base URL is unusable.
pub fn logout_url(credential: &Credential) -> Result<Url, AuthError> {
    let mut url = auth_url(credential, "logout")?;
    url.query_pairs_mut()
        .append_pair("session", credential.service_type.as_str());
    Ok(url)
}

fn parse_envelope(endpoint: &str, body: &[u8]) -> Result<AuthEnvelope, AuthError> {
    serde_json::from_slice(body).map_err(|e| AuthError::invalid_response(endpoint, e.to_string()))
}

/// Performs the login handshake. Exactly one network attempt.
///
/// On success the returned session is NOT stored on `credential`; callers
/// attach it with [`Credential::set_session`].
///
/// # Errors
///
/// - [`AuthError::Rejected`] with the translated vendor message when DSM
///   answers `success: false`
/// - [`AuthError::HttpStatus`] / [`AuthError::InvalidResponse`] for unexpected
///   responses
/// - [`AuthError::Transport`] for network failures
#[instrument(skip_all, fields(base_url = %credential.base_url, service = %credential.service_type))]
pub async fn authenticate(
    transport: &dyn Transport,
    credential: &Credential,
) -> Result<Session, AuthError> {
    let url = login_url(credential)?;
    let endpoint = redact_url(&url);
    let request = PreparedRequest::new(HttpMethod::Get, url).header("Accept", "application/json");

    let response = transport.send(request).await?;
    if !response.is_success() {
        warn!(status = response.status, "login endpoint returned error status");
        return Err(AuthError::HttpStatus {
            endpoint,
            status: response.status,
        });
    }

    let envelope = parse_envelope(&endpoint, &response.body)?;
    if !envelope.success {
        let code = envelope.error_code();
        warn!(code, "login rejected");
        return Err(AuthError::rejected(code));
    }

    let data = envelope
        .data
        .ok_or_else(|| AuthError::invalid_response(&endpoint, "success without session data"))?;
    info!(username = %credential.username, "login succeeded");
    Ok(Session::new(data.sid, data.did))
}

/// Ends the credential's current session on the NAS.
///
/// The session is left on `credential`; callers clear it themselves.
///
/// # Errors
///
/// Returns [`AuthError::NoSession`] when the credential is unauthenticated,
/// [`AuthError::LogoutRejected`] when DSM answers `success: false`, and the
/// same transport/response errors as [`authenticate`].
#[instrument(skip_all, fields(base_url = %credential.base_url))]
pub async fn logout(transport: &dyn Transport, credential: &Credential) -> Result<(), AuthError> {
    let session = credential.session().ok_or(AuthError::NoSession)?;
    let url = logout_url(credential)?;
    let endpoint = redact_url(&url);
    let request = PreparedRequest::new(HttpMethod::Get, url)
        .header("Accept", "application/json")
        .header("Cookie", session.cookie_header());

    let response = transport.send(request).await?;
    if !response.is_success() {
        return Err(AuthError::HttpStatus {
            endpoint,
            status: response.status,
        });
    }

    let envelope = parse_envelope(&endpoint, &response.body)?;
    if !envelope.success {
        return Err(AuthError::logout_rejected(envelope.error_code()));
    }
    debug!("logout succeeded");
    Ok(())
}
