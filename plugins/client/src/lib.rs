//! Client side of the Scribe save protocol
//!
//! The [`SaveController`] drives one save round-trip per user request and a
//! single-shot keepalive ping. Everything it touches outside itself (the
//! editor widget, the document, the browsing context and the network) comes
//! in through the traits in [`page`] and [`transport`], so hosts can plug in
//! a real browser binding or the in-memory page from [`memory`].

pub mod controller;
pub mod memory;
pub mod page;
pub mod text_source;
pub mod transport;

pub use controller::{EventDisposition, SaveController, SaveOutcome, SaveTrigger};
pub use memory::{InputState, MemoryPage, MemoryTextArea, MemoryWidget};
pub use page::{EditorWidget, Navigator, PageDom, PageHandles, TextArea};
pub use text_source::TextSource;
pub use transport::{HttpTransport, Transport, TransportResponse};
