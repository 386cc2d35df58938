//! Capabilities the save controller consumes from its host page

use async_trait::async_trait;
use scribe_core::Result;
use std::sync::Arc;

/// Rich editing widget that owns the buffer being edited
pub trait EditorWidget: Send + Sync {
    /// Whether the widget is attached and able to report its text
    fn is_available(&self) -> bool;

    /// The current contents of the buffer
    fn current_text(&self) -> String;
}

/// Plain text area used when the rich widget is not available
pub trait TextArea: Send + Sync {
    fn value(&self) -> String;
}

/// The part of the document the controller reads and patches
#[async_trait]
pub trait PageDom: Send + Sync {
    /// Value of the input with the given `name`, `None` when there is no such input
    async fn input_value(&self, name: &str) -> Option<String>;

    /// Replace the value of the input with the given `name`
    async fn set_input_value(&self, name: &str, value: &str) -> Result<()>;

    /// Replace the inline style of the input with the given `name`
    async fn set_input_style(&self, name: &str, style: &str) -> Result<()>;

    /// Replace the inner markup of the element with the given `id`
    async fn set_element_html(&self, id: &str, html: &str) -> Result<()>;
}

/// Browsing context: where the page lives and how to leave it
#[async_trait]
pub trait Navigator: Send + Sync {
    /// URL of the page hosting the editor; saves are posted here
    fn current_url(&self) -> String;

    /// Send the browser to `url`
    async fn navigate(&self, url: &str);
}

/// Everything the controller needs from the page, bundled for construction
#[derive(Clone)]
pub struct PageHandles {
    pub widget: Option<Arc<dyn EditorWidget>>,
    pub text_area: Arc<dyn TextArea>,
    pub dom: Arc<dyn PageDom>,
    pub navigator: Arc<dyn Navigator>,
}
