//! Save session controller
//!
//! One user-triggered save is one round-trip: read the buffer, encode it with
//! the hidden form fields, post it to the page URL and patch the page from
//! the JSON reply. The status field (the `saved_on` input) shows progress.
//! There is no in-flight guard; overlapping saves race and the last reply to
//! arrive wins.

use crate::page::{EditorWidget, Navigator, PageDom, PageHandles, TextArea};
use crate::text_source::TextSource;
use crate::transport::Transport;
use scribe_core::{
    encode_multipart, make_field, render_exposed, ClientConfig, ExposedLink, FileSnapshot,
    MultipartPayload, Result, SaveReply, SaveResponse, SaveStatus, ScribeError,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

/// What the host should do with the event that triggered a save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    /// Suppress the browser's own form submission
    PreventDefault,
}

/// Result of one save attempt
#[derive(Debug)]
pub enum SaveOutcome {
    Saved {
        file_hash: String,
        saved_on: String,
        exposed: Vec<ExposedLink>,
    },
    Redirected {
        location: String,
    },
    Failed(ScribeError),
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved { .. })
    }
}

/// Returned by [`SaveController::on_save_requested`]
#[derive(Debug)]
pub struct SaveTrigger {
    pub disposition: EventDisposition,
    pub attempt: JoinHandle<SaveOutcome>,
}

pub struct SaveController {
    config: ClientConfig,
    widget: Option<Arc<dyn EditorWidget>>,
    text_area: Arc<dyn TextArea>,
    dom: Arc<dyn PageDom>,
    navigator: Arc<dyn Navigator>,
    transport: Arc<dyn Transport>,
    status: RwLock<SaveStatus>,
}

impl SaveController {
    pub fn new(config: ClientConfig, page: PageHandles, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            widget: page.widget,
            text_area: page.text_area,
            dom: page.dom,
            navigator: page.navigator,
            transport,
            status: RwLock::new(SaveStatus::Idle),
        }
    }

    /// Status most recently rendered on the page
    pub async fn status(&self) -> SaveStatus {
        *self.status.read().await
    }

    /// Event handler entry point: starts a save in the background and
    /// always asks the host to suppress default form submission.
    pub fn on_save_requested(self: &Arc<Self>) -> SaveTrigger {
        let controller = Arc::clone(self);
        let attempt = tokio::spawn(async move { controller.save().await });

        SaveTrigger {
            disposition: EventDisposition::PreventDefault,
            attempt,
        }
    }

    /// Run one save attempt to completion
    pub async fn save(&self) -> SaveOutcome {
        let attempt = Uuid::new_v4();
        let span = tracing::info_span!("save", %attempt);

        async move {
            match self.run_save().await {
                Ok(SaveReply::Saved {
                    file_hash,
                    saved_on,
                    exposed,
                }) => {
                    info!("Saved, file hash {}", file_hash);
                    SaveOutcome::Saved {
                        file_hash,
                        saved_on,
                        exposed,
                    }
                }
                Ok(SaveReply::Redirect { location }) => {
                    info!("Server refused the save, redirecting to {}", location);
                    SaveOutcome::Redirected { location }
                }
                Err(e) => {
                    warn!("Save failed: {}", e);
                    self.show_error().await;
                    SaveOutcome::Failed(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Single-shot keepalive ping. Success changes nothing on the page.
    pub async fn ping(&self, url: &str) -> Result<()> {
        let timeout = self.config.keepalive_timeout();

        let result = match tokio::time::timeout(timeout, self.transport.get(url)).await {
            Ok(response) => response.and_then(|r| r.require_success()).map(|_| ()),
            Err(_) => Err(ScribeError::communication(format!(
                "Keepalive to {} timed out after {} ms",
                url, self.config.keepalive_timeout_ms
            ))),
        };

        match result {
            Ok(()) => {
                debug!("Keepalive to {} succeeded", url);
                Ok(())
            }
            Err(e) => {
                warn!("Keepalive failed: {}", e);
                self.show_error().await;
                Err(e)
            }
        }
    }

    /// Fetch the file behind the page URL and copy its hash and modification
    /// time into the hidden inputs. `None` when the file does not exist yet.
    pub async fn seed_inputs(&self) -> Result<Option<FileSnapshot>> {
        let url = self.navigator.current_url();
        let request = self.transport.get(&url);
        let response = match tokio::time::timeout(self.config.save_timeout(), request).await {
            Ok(response) => response?,
            Err(_) => {
                return Err(ScribeError::communication(format!(
                    "Loading {} timed out after {} ms",
                    url, self.config.save_timeout_ms
                )))
            }
        };
        if response.status == 404 {
            debug!("{} does not exist yet", url);
            return Ok(None);
        }

        let snapshot = FileSnapshot::from_slice(&response.require_success()?.body)?;
        self.dom
            .set_input_value(&self.config.file_hash_input, &snapshot.file_hash)
            .await?;
        self.dom
            .set_input_value(&self.config.saved_on_input, &snapshot.saved_on)
            .await?;
        debug!("Seeded inputs from {}, file hash {}", url, snapshot.file_hash);
        Ok(Some(snapshot))
    }

    /// Read the buffer and hidden inputs and encode them
    pub async fn prepare_payload(&self) -> MultipartPayload {
        let source = TextSource::select(self.widget.as_ref(), &self.text_area);
        let data = source.read();
        debug!("Read {} bytes from {}", data.len(), source.kind());

        let file_hash = self
            .dom
            .input_value(&self.config.file_hash_input)
            .await
            .unwrap_or_default();
        let saved_on = self
            .dom
            .input_value(&self.config.saved_on_input)
            .await
            .unwrap_or_default();

        encode_multipart(&[
            make_field("data", data),
            make_field("file_hash", file_hash),
            make_field("saved_on", saved_on),
            make_field("from_ajax", "true"),
        ])
    }

    async fn run_save(&self) -> Result<SaveReply> {
        let payload = self.prepare_payload().await;
        let label = self.config.saving_label.clone();
        self.show_status(SaveStatus::Saving, Some(&label)).await;

        let url = self.navigator.current_url();
        debug!(
            "Posting {} bytes to {} with boundary {}",
            payload.body.len(),
            url,
            payload.boundary
        );

        let content_type = payload.content_type();
        let request = self.transport.post(&url, &content_type, payload.body);
        let response = match tokio::time::timeout(self.config.save_timeout(), request).await {
            Ok(response) => response?.require_success()?,
            Err(_) => {
                return Err(ScribeError::communication(format!(
                    "Save timed out after {} ms",
                    self.config.save_timeout_ms
                )))
            }
        };

        let reply = SaveResponse::from_slice(&response.body)?.into_reply()?;
        self.apply_reply(&reply).await;
        Ok(reply)
    }

    /// Patch the page from a validated reply. The file is already stored at
    /// this point, so a missing input or element only loses that one update.
    async fn apply_reply(&self, reply: &SaveReply) {
        match reply {
            SaveReply::Saved {
                file_hash,
                saved_on,
                exposed,
            } => {
                log_page_error(
                    self.dom
                        .set_input_value(&self.config.file_hash_input, file_hash)
                        .await,
                );
                log_page_error(
                    self.dom
                        .set_input_value(&self.config.saved_on_input, saved_on)
                        .await,
                );
                self.show_status(SaveStatus::Saved, None).await;

                if let Some(html) = render_exposed(exposed) {
                    log_page_error(
                        self.dom
                            .set_element_html(&self.config.exposed_element, &html)
                            .await,
                    );
                }
            }
            SaveReply::Redirect { location } => {
                self.navigator.navigate(location).await;
            }
        }
    }

    async fn show_status(&self, status: SaveStatus, label: Option<&str>) {
        *self.status.write().await = status;

        let field = &self.config.saved_on_input;
        if let Some(style) = self.config.styles.for_status(status) {
            log_page_error(self.dom.set_input_style(field, style).await);
        }
        if let Some(label) = label {
            log_page_error(self.dom.set_input_value(field, label).await);
        }
    }

    async fn show_error(&self) {
        let label = self.config.error_label.clone();
        self.show_status(SaveStatus::Error, Some(&label)).await;
    }
}

fn log_page_error(result: Result<()>) {
    if let Err(e) = result {
        warn!("Could not update the page: {}", e);
    }
}
