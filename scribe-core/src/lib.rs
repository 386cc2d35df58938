//! Scribe Core - shared pieces of the editor save protocol
//!
//! This crate holds the error type, configuration, the multipart payload
//! encoder, the save status model and the server reply model used by both
//! the save controller and the reference endpoint.

pub mod config;
pub mod error;
pub mod multipart;
pub mod response;
pub mod status;

// Re-export commonly used types
pub use config::{ClientConfig, Config, ServerConfig};
pub use error::{Result, ScribeError};
pub use multipart::{
    boundary_from_content_type, encode_multipart, encode_multipart_with_boundary, make_field,
    parse_multipart, Field, MultipartPayload,
};
pub use response::{render_exposed, ExposedLink, FileSnapshot, SaveReply, SaveResponse};
pub use status::{SaveStatus, StatusStyles};
