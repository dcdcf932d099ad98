//! Hand-rolled `multipart/form-data` encoder.
//!
//! The Drive upload endpoint is strict about part order (metadata fields must
//! precede the file part), so the body is assembled byte by byte from an
//! ordered field list instead of going through a general form builder.
//!
//! # Example
//!
//! ```
//! use syno_drive_core::multipart::{MultipartField, encode};
//!
//! let body = encode(&[
//!     MultipartField::text("path", "/mydrive/a.txt"),
//!     MultipartField::file("file", b"hello".to_vec(), "a.txt", Some("text/plain")),
//! ]);
//! assert!(body.content_type.ends_with(&body.boundary));
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

const CRLF: &[u8] = b"\r\n";
const BOUNDARY_SUFFIX_LEN: usize = 13;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Payload of a single form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Bytes(Vec<u8>),
}

/// One part of a multipart body.
///
/// A field is encoded as a file part only when it has a filename AND a byte
/// value. Bytes without a filename are decoded as UTF-8 (lossily) and sent as
/// text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartField {
    pub name: String,
    pub value: FieldValue,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

impl MultipartField {
    /// Creates a plain text field.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FieldValue::Text(value.into()),
            filename: None,
            content_type: None,
        }
    }

    /// Creates a file field.
    #[must_use]
    pub fn file(
        name: impl Into<String>,
        bytes: Vec<u8>,
        filename: impl Into<String>,
        content_type: Option<&str>,
    ) -> Self {
        Self {
            name: name.into(),
            value: FieldValue::Bytes(bytes),
            filename: Some(filename.into()),
            content_type: content_type.map(str::to_string),
        }
    }

    /// Creates a byte field with no filename. Encoded as text.
    #[must_use]
    pub fn bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            value: FieldValue::Bytes(bytes),
            filename: None,
            content_type: None,
        }
    }
}

/// Result of one [`encode`] call.
#[derive(Debug, Clone)]
pub struct EncodedBody {
    /// Complete request body including the closing delimiter.
    pub bytes: Vec<u8>,
    /// Boundary token used in `bytes`.
    pub boundary: String,
    /// Value for the `Content-Type` request header.
    pub content_type: String,
}

/// Encodes `fields` in order with a freshly generated boundary.
///
/// The boundary is not checked against field contents; callers must not send
/// data that contains it.
#[must_use]
pub fn encode(fields: &[MultipartField]) -> EncodedBody {
    encode_with_boundary(fields, &generate_boundary())
}

/// Encodes `fields` in order using a caller-supplied boundary.
#[must_use]
pub fn encode_with_boundary(fields: &[MultipartField], boundary: &str) -> EncodedBody {
    let mut bytes = Vec::with_capacity(estimate_len(fields, boundary));

    for field in fields {
        match (&field.value, field.filename.as_deref()) {
            (FieldValue::Bytes(data), Some(filename)) => {
                write_file_part(
                    &mut bytes,
                    boundary,
                    &field.name,
                    filename,
                    field.content_type.as_deref(),
                    data,
                );
            }
            (FieldValue::Text(text), _) => {
                write_text_part(&mut bytes, boundary, &field.name, text);
            }
            (FieldValue::Bytes(data), None) => {
                let text = String::from_utf8_lossy(data);
                write_text_part(&mut bytes, boundary, &field.name, &text);
            }
        }
    }

    bytes.extend_from_slice(b"--");
    bytes.extend_from_slice(boundary.as_bytes());
    bytes.extend_from_slice(b"--");
    bytes.extend_from_slice(CRLF);

    EncodedBody {
        bytes,
        boundary: boundary.to_string(),
        content_type: format!("multipart/form-data; boundary={boundary}"),
    }
}

fn write_text_part(out: &mut Vec<u8>, boundary: &str, name: &str, text: &str) {
    out.extend_from_slice(
        format!("--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n")
            .as_bytes(),
    );
    out.extend_from_slice(text.as_bytes());
    out.extend_from_slice(CRLF);
}

fn write_file_part(
    out: &mut Vec<u8>,
    boundary: &str,
    name: &str,
    filename: &str,
    content_type: Option<&str>,
    data: &[u8],
) {
    let content_type_line = content_type
        .map(|ct| format!("Content-Type: {ct}\r\n"))
        .unwrap_or_default();
    out.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n{content_type_line}\r\n"
        )
        .as_bytes(),
    );
    out.extend_from_slice(data);
    out.extend_from_slice(CRLF);
}

fn estimate_len(fields: &[MultipartField], boundary: &str) -> usize {
    let per_part_overhead = boundary.len() + 128;
    let payload: usize = fields
        .iter()
        .map(|f| match &f.value {
            FieldValue::Text(t) => t.len(),
            FieldValue::Bytes(b) => b.len(),
        })
        .sum();
    payload + per_part_overhead * (fields.len() + 1)
}

/// Generates `----syno-drive-<unix millis>-<13 base36 chars>`.
fn generate_boundary() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let mut rng = rand::thread_rng();
    let suffix: String = (0..BOUNDARY_SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
        .collect();
    format!("----syno-drive-{millis}-{suffix}")
}
