//! Request pipeline for Drive file operations.
//!
//! Each operation runs in three fixed steps:
//!
//! 1. **prepare**: validate parameters, look up the [`Route`], run its body
//!    builder, attach the session cookie
//! 2. **send**: one call to the [`Transport`]
//! 3. **interpret**: pass JSON through, or classify a download response
//!
//! Nothing is retried. A failure at any step is returned as-is.

mod builders;
mod params;
mod routes;

use tracing::{debug, instrument, warn};

pub use builders::{BodyBuilder, RequestParts, compose_upload_path};
pub use params::{
    ConflictAction, CreateKind, CreateParams, DEFAULT_LIMIT, DeleteParams, DownloadParams,
    ListParams, Operation, Paging, SearchParams, SortBy, SortDirection, UploadFile, UploadParams,
};
pub use routes::{OperationKind, ResponseHandler, Route, route};

use crate::auth::Session;
use crate::download::{ResponsePayload, classify};
use crate::error::DriveError;
use crate::transport::{PreparedRequest, RawResponse, Transport, endpoint_url, redact_url};

/// Result of a successful round trip.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutput {
    /// JSON body from a non-download operation, unmodified.
    Json(serde_json::Value),
    /// Download result: the file, or the JSON error DSM sent instead.
    Download(ResponsePayload),
}

/// Builds requests against one NAS and interprets the responses.
#[derive(Debug, Clone)]
pub struct RequestPipeline {
    base_url: String,
}

impl RequestPipeline {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Validates `operation` and builds the outgoing request.
    ///
    /// # Errors
    ///
    /// - [`DriveError::Validation`] for missing or invalid parameters
    /// - [`DriveError::InvalidUrl`] when the base URL is unusable
    pub fn prepare(
        &self,
        operation: &Operation,
        session: &Session,
    ) -> Result<PreparedRequest, DriveError> {
        operation.validate()?;
        let route = route(operation.kind());
        let parts = (route.body_builder)(operation)?;

        let mut url = endpoint_url(&self.base_url, route.path)
            .ok_or_else(|| DriveError::invalid_url(self.base_url.clone()))?;
        if !parts.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&parts.query);
        }

        let mut request = PreparedRequest::new(route.method, url)
            .header("Cookie", session.cookie_header());
        for (name, value) in parts.headers {
            request = request.header(name, value);
        }
        if let Some(body) = parts.body {
            request = request.body(body);
        }
        Ok(request)
    }

    /// Turns a raw response into an [`OperationOutput`].
    ///
    /// Download responses are classified by Content-Type regardless of status,
    /// except that a non-2xx response that is not JSON is an HTTP error.
    ///
    /// # Errors
    ///
    /// - [`DriveError::HttpStatus`] for non-2xx responses without a JSON body
    /// - [`DriveError::Parse`] when a JSON body does not parse
    pub fn interpret(
        kind: OperationKind,
        endpoint: &str,
        response: RawResponse,
    ) -> Result<OperationOutput, DriveError> {
        match route(kind).response_handler {
            ResponseHandler::Json => {
                if !response.is_success() {
                    warn!(status = response.status, operation = %kind, "operation returned error status");
                    return Err(DriveError::HttpStatus {
                        endpoint: endpoint.to_string(),
                        status: response.status,
                    });
                }
                if response.body.is_empty() {
                    return Ok(OperationOutput::Json(serde_json::Value::Null));
                }
                let value = serde_json::from_slice(&response.body)
                    .map_err(|e| DriveError::parse(kind.as_str(), e))?;
                Ok(OperationOutput::Json(value))
            }
            ResponseHandler::ClassifyDownload => {
                let ok = response.is_success();
                let payload = classify(&response.headers, response.body)
                    .map_err(|e| DriveError::parse(kind.as_str(), e))?;
                if !ok && matches!(payload, ResponsePayload::BinaryFile(_)) {
                    return Err(DriveError::HttpStatus {
                        endpoint: endpoint.to_string(),
                        status: response.status,
                    });
                }
                Ok(OperationOutput::Download(payload))
            }
        }
    }

    /// Prepares, sends, and interprets one operation.
    ///
    /// # Errors
    ///
    /// Any error from [`prepare`](Self::prepare), the transport, or
    /// [`interpret`](Self::interpret).
    #[instrument(skip_all, fields(operation = %operation.kind()))]
    pub async fn execute(
        &self,
        transport: &dyn Transport,
        session: &Session,
        operation: &Operation,
    ) -> Result<OperationOutput, DriveError> {
        let request = self.prepare(operation, session)?;
        let endpoint = redact_url(&request.url);
        debug!(%endpoint, method = %request.method, "executing operation");
        let response = transport.send(request).await?;
        Self::interpret(operation.kind(), &endpoint, response)
    }
}
