//! Multipart payload encoding for editor saves
//!
//! The framing produced here is deliberately narrow: flat string fields only,
//! no transfer encoding, and a body that ends with a plain `--{boundary}\r\n`
//! delimiter line instead of the `--{boundary}--` closing marker. The paired
//! [`parse_multipart`] accepts both endings.

use crate::error::{Result, ScribeError};
use rand::Rng;
use std::fmt::Display;

/// Exclusive upper bound of the numeric boundary token
pub const BOUNDARY_RANGE: u32 = 10_000;

/// One named part of a multipart body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub data: String,
}

impl Field {
    /// Build a field from any value with a string form
    pub fn from_display<T: Display + ?Sized>(name: impl Into<String>, value: &T) -> Self {
        make_field(name, value.to_string())
    }
}

/// Build a field. No validation is applied to either side.
pub fn make_field(name: impl Into<String>, data: impl Into<String>) -> Field {
    Field {
        name: name.into(),
        data: data.into(),
    }
}

/// An encoded body together with the boundary it was framed with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartPayload {
    pub body: String,
    pub boundary: String,
}

impl MultipartPayload {
    /// Value for the `Content-Type` request header
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary=\"{}\"", self.boundary)
    }
}

/// Pick a fresh boundary token: the decimal form of a random integer in `[0, 10000)`
pub fn generate_boundary() -> String {
    rand::thread_rng().gen_range(0..BOUNDARY_RANGE).to_string()
}

/// Encode `fields` in order with a freshly generated boundary
pub fn encode_multipart(fields: &[Field]) -> MultipartPayload {
    encode_multipart_with_boundary(fields, generate_boundary())
}

/// Encode `fields` in order with the given boundary
pub fn encode_multipart_with_boundary(
    fields: &[Field],
    boundary: impl Into<String>,
) -> MultipartPayload {
    let boundary = boundary.into();
    let delimiter = format!("--{}\r\n", boundary);

    let mut body = String::new();
    for field in fields {
        body.push_str(&delimiter);
        body.push_str("content-disposition: form-data; name=\"");
        body.push_str(&field.name);
        body.push('"');
        body.push_str("\r\n\r\n");
        body.push_str(&field.data);
        body.push_str("\r\n");
    }
    body.push_str(&delimiter);

    tracing::trace!(
        "Encoded {} multipart fields ({} bytes) with boundary {}",
        fields.len(),
        body.len(),
        boundary
    );

    MultipartPayload { body, boundary }
}

/// Extract the boundary parameter from a `Content-Type` header value
pub fn boundary_from_content_type(content_type: &str) -> Option<String> {
    let mut params = content_type.split(';');
    let media_type = params.next()?.trim();
    if !media_type.eq_ignore_ascii_case("multipart/form-data") {
        return None;
    }

    params.find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("boundary") {
            return None;
        }
        let value = value.trim().trim_matches('"');
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    })
}

/// Parse a body framed by [`encode_multipart`] or by a standard encoder.
///
/// Parsing stops at a `--{boundary}--` terminator or at a trailing delimiter
/// with nothing after it. Data containing the delimiter is not supported.
pub fn parse_multipart(body: &str, boundary: &str) -> Result<Vec<Field>> {
    if boundary.is_empty() {
        return Err(ScribeError::encoding("Empty multipart boundary"));
    }

    let delimiter = format!("--{}", boundary);
    let mut segments = body.split(delimiter.as_str());

    // Anything before the first delimiter is preamble
    segments.next();

    let mut fields = Vec::new();
    let mut terminated = false;

    for segment in segments {
        if segment.starts_with("--") {
            terminated = true;
            break;
        }

        let part = segment.strip_prefix("\r\n").unwrap_or(segment);
        if part.is_empty() {
            terminated = true;
            break;
        }

        let (headers, data) = part.split_once("\r\n\r\n").ok_or_else(|| {
            ScribeError::encoding("Multipart part is missing the header separator")
        })?;
        let data = data.strip_suffix("\r\n").unwrap_or(data);

        let name = headers
            .split("\r\n")
            .find_map(disposition_name)
            .ok_or_else(|| ScribeError::encoding("Multipart part has no field name"))?;

        fields.push(make_field(name, data));
    }

    if !terminated {
        return Err(ScribeError::encoding("Multipart body is not terminated"));
    }

    Ok(fields)
}

/// Read `name="..."` out of a content-disposition header line
fn disposition_name(line: &str) -> Option<String> {
    let (header, value) = line.split_once(':')?;
    if !header.trim().eq_ignore_ascii_case("content-disposition") {
        return None;
    }

    value.split(';').find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("name") {
            Some(value.trim().trim_matches('"').to_string())
        } else {
            None
        }
    })
}
