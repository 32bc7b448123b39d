//! `multipart/form-data` bodies for file uploads.

use std::path::Path;

use cio_oauth::Parameters;
use rand::RngExt;

use crate::error::ClientError;

/// A file part of a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Form field name.
    pub field: String,
    /// File name sent in `Content-Disposition`.
    pub filename: String,
    /// Content type of the part.
    pub content_type: String,
    /// File contents.
    pub data: Vec<u8>,
}

impl Upload {
    /// Create an upload from bytes.
    pub fn new(
        field: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            field: field.into(),
            filename: filename.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Read a file for upload as `field`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Io`] if the file cannot be read.
    pub fn from_file(
        field: impl Into<String>,
        path: &Path,
        content_type: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let data = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(field, filename, content_type, data))
    }
}

/// Encoded multipart body with its `Content-Type` header value.
pub(crate) struct MultipartBody {
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Encode `fields` followed by `upload` as `multipart/form-data`.
pub(crate) fn encode(fields: &Parameters, upload: &Upload) -> MultipartBody {
    let boundary = format!("----CioFormBoundary{:016x}", rand::rng().random::<u64>());
    encode_with_boundary(fields, upload, &boundary)
}

fn encode_with_boundary(fields: &Parameters, upload: &Upload, boundary: &str) -> MultipartBody {
    let mut body = Vec::new();

    for (name, value) in fields.iter() {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            upload.field,
            upload.filename.replace('"', "%22")
        )
        .as_bytes(),
    );
    let content_type = format!("Content-Type: {}\r\n\r\n", upload.content_type);
    body.extend_from_slice(content_type.as_bytes());
    body.extend_from_slice(&upload.data);
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    MultipartBody {
        content_type: format!("multipart/form-data; boundary={boundary}"),
        body,
    }
}
