//! Route table: operation → method, endpoint, body builder, response handler.

use std::fmt;

use super::builders::{self, BodyBuilder};
use crate::constants::{
    CREATE_PATH, DELETE_PATH, DOWNLOAD_PATH, LIST_PATH, RECENT_PATH, SEARCH_PATH, UPLOAD_PATH,
};
use crate::transport::HttpMethod;

/// Identifier for each Drive operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    List,
    Search,
    Recent,
    Create,
    Upload,
    Delete,
    Download,
}

impl OperationKind {
    pub const ALL: [Self; 7] = [
        Self::List,
        Self::Search,
        Self::Recent,
        Self::Create,
        Self::Upload,
        Self::Delete,
        Self::Download,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Search => "search",
            Self::Recent => "recent",
            Self::Create => "create",
            Self::Upload => "upload",
            Self::Delete => "delete",
            Self::Download => "download",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a response is turned into an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseHandler {
    /// Body is JSON and is passed through as-is.
    Json,
    /// Body may be a file or a JSON error; see [`crate::download::classify`].
    ClassifyDownload,
}

/// Everything needed to turn an operation into a request and back.
#[derive(Clone, Copy)]
pub struct Route {
    pub method: HttpMethod,
    /// Path relative to the NAS base URL.
    pub path: &'static str,
    pub body_builder: BodyBuilder,
    pub response_handler: ResponseHandler,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("response_handler", &self.response_handler)
            .finish_non_exhaustive()
    }
}

/// Looks up the route for an operation.
#[must_use]
pub fn route(kind: OperationKind) -> Route {
    let json = |method, path, body_builder: BodyBuilder| Route {
        method,
        path,
        body_builder,
        response_handler: ResponseHandler::Json,
    };
    match kind {
        OperationKind::List => json(HttpMethod::Post, LIST_PATH, builders::list),
        OperationKind::Search => json(HttpMethod::Post, SEARCH_PATH, builders::search),
        OperationKind::Recent => json(HttpMethod::Get, RECENT_PATH, builders::none),
        OperationKind::Create => json(HttpMethod::Post, CREATE_PATH, builders::create),
        OperationKind::Upload => json(HttpMethod::Put, UPLOAD_PATH, builders::upload),
        OperationKind::Delete => json(HttpMethod::Post, DELETE_PATH, builders::delete),
        OperationKind::Download => Route {
            method: HttpMethod::Post,
            path: DOWNLOAD_PATH,
            body_builder: builders::download,
            response_handler: ResponseHandler::ClassifyDownload,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_methods() {
        assert_eq!(route(OperationKind::Recent).method, HttpMethod::Get);
        assert_eq!(route(OperationKind::Upload).method, HttpMethod::Put);
        for kind in [
            OperationKind::List,
            OperationKind::Search,
            OperationKind::Create,
            OperationKind::Delete,
            OperationKind::Download,
        ] {
            assert_eq!(route(kind).method, HttpMethod::Post, "{kind}");
        }
    }

    #[test]
    fn test_route_paths_share_prefix() {
        for kind in OperationKind::ALL {
            assert!(
                route(kind).path.starts_with("/api/SynologyDrive/default/v1/files"),
                "{kind}"
            );
        }
        assert_eq!(
            route(OperationKind::Download).path,
            "/api/SynologyDrive/default/v1/files/download"
        );
        assert_eq!(
            route(OperationKind::Create).path,
            "/api/SynologyDrive/default/v1/files"
        );
    }

    #[test]
    fn test_only_download_classifies() {
        for kind in OperationKind::ALL {
            let expected = if kind == OperationKind::Download {
                ResponseHandler::ClassifyDownload
            } else {
                ResponseHandler::Json
            };
            assert_eq!(route(kind).response_handler, expected, "{kind}");
        }
    }
}
