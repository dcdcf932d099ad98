//! High-level client: one credential, one transport, one session at a time.
//!
//! ```no_run
//! use syno_drive_core::{Credential, DriveClient, Operation};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credential = Credential::new("https://nas.local:5001", "alice", "secret");
//! let mut client = DriveClient::new(credential)?;
//! client.login().await?;
//! let recent = client.execute(&Operation::Recent).await?;
//! println!("{recent:?}");
//! client.logout().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tracing::{info, instrument};

use crate::auth::{self, AuthError, Credential, Session};
use crate::error::DriveError;
use crate::pipeline::{Operation, OperationOutput, RequestPipeline};
use crate::transport::{ClientConfig, HttpTransport, Transport, TransportError};

/// Drive API client bound to one NAS account.
pub struct DriveClient {
    credential: Credential,
    pipeline: RequestPipeline,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for DriveClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveClient")
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}

impl DriveClient {
    /// Creates a client with the default HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ClientBuild`] when the HTTP client cannot be built.
    pub fn new(credential: Credential) -> Result<Self, TransportError> {
        Self::with_config(credential, &ClientConfig::default())
    }

    /// Creates a client with explicit timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ClientBuild`] when the HTTP client cannot be built.
    pub fn with_config(credential: Credential, config: &ClientConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(config, credential.allow_self_signed)?;
        Ok(Self::with_transport(credential, Arc::new(transport)))
    }

    /// Creates a client over a caller-supplied transport.
    #[must_use]
    pub fn with_transport(credential: Credential, transport: Arc<dyn Transport>) -> Self {
        let pipeline = RequestPipeline::new(credential.base_url.clone());
        Self {
            credential,
            pipeline,
            transport,
        }
    }

    #[must_use]
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.credential.session()
    }

    /// Logs in and stores the session. Replaces any existing session.
    ///
    /// # Errors
    ///
    /// See [`auth::authenticate`]. On failure the previous session is dropped.
    #[instrument(skip(self))]
    pub async fn login(&mut self) -> Result<&Session, AuthError> {
        self.credential.clear_session();
        let session = auth::authenticate(self.transport.as_ref(), &self.credential).await?;
        self.credential.set_session(session);
        self.credential.session().ok_or(AuthError::NoSession)
    }

    /// Logs out and clears the stored session.
    ///
    /// The session is cleared even when DSM rejects the logout.
    ///
    /// # Errors
    ///
    /// See [`auth::logout`].
    #[instrument(skip(self))]
    pub async fn logout(&mut self) -> Result<(), AuthError> {
        let result = auth::logout(self.transport.as_ref(), &self.credential).await;
        if self.credential.clear_session().is_some() {
            info!("session cleared");
        }
        result
    }

    /// Runs one operation with the current session.
    ///
    /// # Errors
    ///
    /// [`DriveError::NotAuthenticated`] without a session; otherwise see
    /// [`RequestPipeline::execute`].
    pub async fn execute(&self, operation: &Operation) -> Result<OperationOutput, DriveError> {
        let session = self
            .credential
            .session()
            .ok_or(DriveError::NotAuthenticated {
                operation: operation.kind().as_str(),
            })?;
        self.pipeline
            .execute(self.transport.as_ref(), session, operation)
            .await
    }
}
