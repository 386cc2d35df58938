//! Choosing where the text to save comes from

use crate::page::{EditorWidget, TextArea};
use std::sync::Arc;

/// Source of the buffer for one save attempt
#[derive(Clone)]
pub enum TextSource {
    /// The rich editor widget
    Primary(Arc<dyn EditorWidget>),
    /// The raw text area behind the widget
    Fallback(Arc<dyn TextArea>),
}

impl TextSource {
    /// Prefer the widget when it is present and reports itself available
    pub fn select(widget: Option<&Arc<dyn EditorWidget>>, fallback: &Arc<dyn TextArea>) -> Self {
        match widget {
            Some(widget) if widget.is_available() => TextSource::Primary(widget.clone()),
            _ => TextSource::Fallback(fallback.clone()),
        }
    }

    pub fn read(&self) -> String {
        match self {
            TextSource::Primary(widget) => widget.current_text(),
            TextSource::Fallback(text_area) => text_area.value(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TextSource::Primary(_) => "widget",
            TextSource::Fallback(_) => "text-area",
        }
    }
}

impl std::fmt::Debug for TextSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TextSource::{}", self.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryTextArea, MemoryWidget};

    fn fallback() -> Arc<dyn TextArea> {
        Arc::new(MemoryTextArea::new("from text area"))
    }

    #[test]
    fn test_available_widget_wins() {
        let widget: Arc<dyn EditorWidget> = Arc::new(MemoryWidget::new("from widget"));
        let source = TextSource::select(Some(&widget), &fallback());
        assert_eq!(source.kind(), "widget");
        assert_eq!(source.read(), "from widget");
    }

    #[test]
    fn test_unavailable_widget_falls_back() {
        let widget = MemoryWidget::new("stale");
        widget.set_available(false);
        let widget: Arc<dyn EditorWidget> = Arc::new(widget);

        let source = TextSource::select(Some(&widget), &fallback());
        assert_eq!(source.kind(), "text-area");
        assert_eq!(source.read(), "from text area");
    }

    #[test]
    fn test_missing_widget_falls_back() {
        let source = TextSource::select(None, &fallback());
        assert_eq!(source.read(), "from text area");
        assert_eq!(format!("{:?}", source), "TextSource::text-area");
    }
}
