//! In-memory page used by the CLI and by tests

use crate::page::{EditorWidget, Navigator, PageDom, TextArea};
use async_trait::async_trait;
use scribe_core::{Result, ScribeError};
use std::collections::HashMap;
use std::sync::RwLock as StdRwLock;
use tokio::sync::RwLock;

/// Value and inline style of one form input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    pub value: String,
    pub style: Option<String>,
}

/// A page with named inputs, id'd elements and a location
#[derive(Debug)]
pub struct MemoryPage {
    url: String,
    inputs: RwLock<HashMap<String, InputState>>,
    elements: RwLock<HashMap<String, String>>,
    location: RwLock<Option<String>>,
}

impl MemoryPage {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            inputs: RwLock::new(HashMap::new()),
            elements: RwLock::new(HashMap::new()),
            location: RwLock::new(None),
        }
    }

    /// Declare an input with an initial value
    pub fn with_input(mut self, name: &str, value: &str) -> Self {
        self.inputs.get_mut().insert(
            name.to_string(),
            InputState {
                value: value.to_string(),
                style: None,
            },
        );
        self
    }

    /// Declare an element with initial markup
    pub fn with_element(mut self, id: &str, html: &str) -> Self {
        self.elements
            .get_mut()
            .insert(id.to_string(), html.to_string());
        self
    }

    pub async fn input(&self, name: &str) -> Option<InputState> {
        self.inputs.read().await.get(name).cloned()
    }

    pub async fn element_html(&self, id: &str) -> Option<String> {
        self.elements.read().await.get(id).cloned()
    }

    /// Where the page was last sent by [`Navigator::navigate`]
    pub async fn location(&self) -> Option<String> {
        self.location.read().await.clone()
    }
}

#[async_trait]
impl PageDom for MemoryPage {
    async fn input_value(&self, name: &str) -> Option<String> {
        self.inputs
            .read()
            .await
            .get(name)
            .map(|input| input.value.clone())
    }

    async fn set_input_value(&self, name: &str, value: &str) -> Result<()> {
        let mut inputs = self.inputs.write().await;
        let input = inputs
            .get_mut(name)
            .ok_or_else(|| ScribeError::page(format!("No input named {}", name)))?;
        input.value = value.to_string();
        Ok(())
    }

    async fn set_input_style(&self, name: &str, style: &str) -> Result<()> {
        let mut inputs = self.inputs.write().await;
        let input = inputs
            .get_mut(name)
            .ok_or_else(|| ScribeError::page(format!("No input named {}", name)))?;
        input.style = Some(style.to_string());
        Ok(())
    }

    async fn set_element_html(&self, id: &str, html: &str) -> Result<()> {
        let mut elements = self.elements.write().await;
        let element = elements
            .get_mut(id)
            .ok_or_else(|| ScribeError::page(format!("No element with id {}", id)))?;
        *element = html.to_string();
        Ok(())
    }
}

#[async_trait]
impl Navigator for MemoryPage {
    fn current_url(&self) -> String {
        self.url.clone()
    }

    async fn navigate(&self, url: &str) {
        tracing::info!("Navigating to {}", url);
        *self.location.write().await = Some(url.to_string());
    }
}

/// Editor widget holding its buffer in memory
#[derive(Debug, Default)]
pub struct MemoryWidget {
    text: StdRwLock<String>,
    available: StdRwLock<bool>,
}

impl MemoryWidget {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: StdRwLock::new(text.into()),
            available: StdRwLock::new(true),
        }
    }

    pub fn set_text(&self, text: impl Into<String>) {
        *self.text.write().unwrap_or_else(|p| p.into_inner()) = text.into();
    }

    pub fn set_available(&self, available: bool) {
        *self.available.write().unwrap_or_else(|p| p.into_inner()) = available;
    }
}

impl EditorWidget for MemoryWidget {
    fn is_available(&self) -> bool {
        *self.available.read().unwrap_or_else(|p| p.into_inner())
    }

    fn current_text(&self) -> String {
        self.text.read().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

/// Text area holding its value in memory
#[derive(Debug, Default)]
pub struct MemoryTextArea {
    value: StdRwLock<String>,
}

impl MemoryTextArea {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: StdRwLock::new(value.into()),
        }
    }
}

impl TextArea for MemoryTextArea {
    fn value(&self) -> String {
        self.value.read().unwrap_or_else(|p| p.into_inner()).clone()
    }
}
