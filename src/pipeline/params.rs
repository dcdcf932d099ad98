//! Typed, validated parameters for each Drive operation.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use super::routes::OperationKind;
use crate::error::DriveError;

/// Default page size for list and search.
pub const DEFAULT_LIMIT: u64 = 50;

/// Declares a `Copy` enum whose variants map one-to-one onto wire strings.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, default = $default:ident, { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            /// Wire value.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(format!(
                        "unknown {} '{other}' (expected one of: {})",
                        stringify!($name),
                        [$($text),+].join(", ")
                    )),
                }
            }
        }
    };
}

string_enum!(
    /// Sort order for list and search results.
    SortDirection, default = Ascending, {
        Ascending => "asc",
        Descending => "desc",
    }
);

string_enum!(
    /// Sort key for list and search results.
    SortBy, default = ModifiedTime, {
        ModifiedTime => "modified_time",
        Size => "size",
        Owner => "owner",
        Type => "type",
        Name => "name",
    }
);

string_enum!(
    /// What the server does when an upload target already exists.
    ConflictAction, default = Version, {
        Overwrite => "overwrite",
        Autorename => "autorename",
        Stop => "stop",
        Version => "version",
    }
);

/// Sorting and paging shared by list and search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paging {
    pub sort_direction: SortDirection,
    pub sort_by: SortBy,
    pub offset: u64,
    pub limit: u64,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            sort_direction: SortDirection::default(),
            sort_by: SortBy::default(),
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Paging {
    fn validate(&self) -> Result<(), DriveError> {
        if self.limit == 0 {
            return Err(DriveError::validation("limit", "must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListParams {
    pub path: String,
    pub paging: Paging,
    /// JSON object, e.g. `{"extensions": ["jpg"], "starred": true}`.
    pub filter: Value,
}

impl ListParams {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            paging: Paging::default(),
            filter: Value::Object(Map::new()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub keyword: String,
    pub paging: Paging,
}

impl SearchParams {
    #[must_use]
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            paging: Paging::default(),
        }
    }
}

/// What to create. Only files carry content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateKind {
    File { content: String },
    Folder,
}

impl CreateKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File { .. } => "file",
            Self::Folder => "folder",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateParams {
    pub path: String,
    pub kind: CreateKind,
}

impl CreateParams {
    #[must_use]
    pub fn folder(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: CreateKind::Folder,
        }
    }

    #[must_use]
    pub fn file(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: CreateKind::File {
                content: content.into(),
            },
        }
    }
}

/// File bytes to upload plus their metadata.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime_type: Option<String>,
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("bytes", &self.bytes.len())
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadParams {
    /// Destination. A trailing `/` means "this folder, keep the source filename".
    pub path: String,
    pub conflict_action: ConflictAction,
    pub file: UploadFile,
}

impl UploadParams {
    #[must_use]
    pub fn new(path: impl Into<String>, file: UploadFile) -> Self {
        Self {
            path: path.into(),
            conflict_action: ConflictAction::default(),
            file,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteParams {
    pub path: String,
    pub permanent: bool,
}

impl DeleteParams {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            permanent: false,
        }
    }
}

/// Single-file download. Archive downloads of several paths are not supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadParams {
    pub path: String,
}

impl DownloadParams {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// One Drive operation with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    List(ListParams),
    Search(SearchParams),
    Recent,
    Create(CreateParams),
    Upload(UploadParams),
    Delete(DeleteParams),
    Download(DownloadParams),
}

fn require_path(path: &str) -> Result<(), DriveError> {
    if path.trim().is_empty() {
        return Err(DriveError::validation("path", "is required"));
    }
    Ok(())
}

impl Operation {
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::List(_) => OperationKind::List,
            Self::Search(_) => OperationKind::Search,
            Self::Recent => OperationKind::Recent,
            Self::Create(_) => OperationKind::Create,
            Self::Upload(_) => OperationKind::Upload,
            Self::Delete(_) => OperationKind::Delete,
            Self::Download(_) => OperationKind::Download,
        }
    }

    /// Checks required parameters. Called before any request is built.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::Validation`] naming the offending parameter.
    pub fn validate(&self) -> Result<(), DriveError> {
        match self {
            Self::List(params) => {
                require_path(&params.path)?;
                params.paging.validate()?;
                if !params.filter.is_object() {
                    return Err(DriveError::validation("filter", "must be a JSON object"));
                }
                Ok(())
            }
            Self::Search(params) => params.paging.validate(),
            Self::Recent => Ok(()),
            Self::Create(params) => require_path(&params.path),
            Self::Upload(params) => {
                require_path(&params.path)?;
                if params.file.filename.trim().is_empty() {
                    return Err(DriveError::validation(
                        "filename",
                        "the uploaded file must have a name",
                    ));
                }
                if params.file.filename.contains(['"', '\r', '\n']) {
                    return Err(DriveError::validation(
                        "filename",
                        "must not contain quotes or line breaks",
                    ));
                }
                Ok(())
            }
            Self::Delete(params) => require_path(&params.path),
            Self::Download(params) => require_path(&params.path),
        }
    }
}
