//! Server reply model for editor saves

use crate::error::{Result, ScribeError};
use serde::{Deserialize, Deserializer, Serialize};

/// JSON document returned by the save endpoint
///
/// `error` is kept as a raw JSON value: the endpoint may send a boolean or a
/// human-readable message, and only its truthiness matters to the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveResponse {
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub error: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub functions: Vec<String>,
}

/// Body of `GET /edit/...`: what an editing page is opened with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSnapshot {
    pub data: String,
    pub file_hash: String,
    pub saved_on: String,
}

impl FileSnapshot {
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|e| ScribeError::response_handling(format!("Malformed file snapshot: {}", e)))
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A validated reply, ready to be applied to the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveReply {
    /// The file was written
    Saved {
        file_hash: String,
        saved_on: String,
        exposed: Vec<ExposedLink>,
    },
    /// The server refused the save and wants the browser elsewhere
    Redirect { location: String },
}

/// Link to one exposed controller function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExposedLink {
    pub name: String,
    pub href: String,
}

impl SaveResponse {
    /// Successful reply
    pub fn saved(file_hash: impl Into<String>, saved_on: impl Into<String>) -> Self {
        Self {
            file_hash: Some(file_hash.into()),
            saved_on: Some(saved_on.into()),
            ..Default::default()
        }
    }

    /// Refusal carrying a message and a redirect target
    pub fn refused(message: impl Into<String>, redirect: impl Into<String>) -> Self {
        Self {
            error: serde_json::Value::String(message.into()),
            redirect: Some(redirect.into()),
            ..Default::default()
        }
    }

    /// Parse a raw response body
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|e| ScribeError::response_handling(format!("Malformed save response: {}", e)))
    }

    /// Whether `error` is set, using JavaScript truthiness
    pub fn is_error(&self) -> bool {
        is_truthy(&self.error)
    }

    /// Validate the reply before anything is written back to the page
    pub fn into_reply(self) -> Result<SaveReply> {
        if self.is_error() {
            let location = self.redirect.ok_or_else(|| {
                ScribeError::response_handling("Error response without a redirect target")
            })?;
            return Ok(SaveReply::Redirect { location });
        }

        let file_hash = self
            .file_hash
            .ok_or_else(|| ScribeError::response_handling("Response is missing file_hash"))?;
        let saved_on = self
            .saved_on
            .ok_or_else(|| ScribeError::response_handling("Response is missing saved_on"))?;

        let exposed = if self.functions.is_empty() {
            Vec::new()
        } else {
            let application = self.application.ok_or_else(|| {
                ScribeError::response_handling("Exposed functions without an application")
            })?;
            let controller = self.controller.ok_or_else(|| {
                ScribeError::response_handling("Exposed functions without a controller")
            })?;
            self.functions
                .into_iter()
                .map(|name| ExposedLink {
                    href: format!("/{}/{}/{}", application, controller, name),
                    name,
                })
                .collect()
        };

        Ok(SaveReply::Saved {
            file_hash,
            saved_on,
            exposed,
        })
    }
}

/// Truthiness of a JSON value as a browser would evaluate it
pub fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}

/// Markup for the exposed-functions element, or `None` when there is nothing to show
pub fn render_exposed(links: &[ExposedLink]) -> Option<String> {
    if links.is_empty() {
        return None;
    }

    let anchors: Vec<String> = links
        .iter()
        .map(|link| {
            format!(
                " <a href=\"{}\">{}</a>",
                html_escape::encode_double_quoted_attribute(&link.href),
                html_escape::encode_text(&link.name)
            )
        })
        .collect();

    Some(format!("exposes {}", anchors.join(",")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_reply() {
        let response: SaveResponse = serde_json::from_value(json!({
            "error": false,
            "file_hash": "h1",
            "saved_on": "t1",
            "functions": []
        }))
        .unwrap();

        assert!(!response.is_error());
        assert_eq!(
            response.into_reply().unwrap(),
            SaveReply::Saved {
                file_hash: "h1".to_string(),
                saved_on: "t1".to_string(),
                exposed: vec![],
            }
        );
    }

    #[test]
    fn test_null_functions_mean_none_exposed() {
        let reply = SaveResponse::from_slice(
            br#"{"error": false, "file_hash": "h1", "saved_on": "t1", "functions": null}"#,
        )
        .unwrap()
        .into_reply()
        .unwrap();
        assert_eq!(
            reply,
            SaveReply::Saved {
                file_hash: "h1".to_string(),
                saved_on: "t1".to_string(),
                exposed: vec![],
            }
        );
    }

    #[test]
    fn test_file_snapshot_parsing() {
        let snapshot = FileSnapshot::from_slice(
            br#"{"data": "x = 1\n", "file_hash": "h", "saved_on": "Mon Jan  1 00:00:00 2024"}"#,
        )
        .unwrap();
        assert_eq!(snapshot.file_hash, "h");
        assert_eq!(snapshot.data, "x = 1\n");
        assert!(matches!(
            FileSnapshot::from_slice(b"not json"),
            Err(ScribeError::ResponseHandling(_))
        ));
    }

    #[test]
    fn test_error_message_is_truthy() {
        let response = SaveResponse::from_slice(
            br#"{"error": "file changed on disk", "redirect": "/resolve/app/x.py"}"#,
        )
        .unwrap();
        assert_eq!(
            response.into_reply().unwrap(),
            SaveReply::Redirect {
                location: "/resolve/app/x.py".to_string()
            }
        );
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!([])));
    }

    #[test]
    fn test_missing_fields_are_rejected() {
        let err = SaveResponse::from_slice(br#"{"error": false, "saved_on": "t1"}"#)
            .unwrap()
            .into_reply()
            .unwrap_err();
        assert!(matches!(err, ScribeError::ResponseHandling(_)));

        let err = SaveResponse::from_slice(br#"{"error": true}"#)
            .unwrap()
            .into_reply()
            .unwrap_err();
        assert!(matches!(err, ScribeError::ResponseHandling(_)));

        let err = SaveResponse::from_slice(
            br#"{"file_hash": "h", "saved_on": "t", "functions": ["index"]}"#,
        )
        .unwrap()
        .into_reply()
        .unwrap_err();
        assert!(matches!(err, ScribeError::ResponseHandling(_)));

        assert!(matches!(
            SaveResponse::from_slice(b"<html>"),
            Err(ScribeError::ResponseHandling(_))
        ));
    }

    #[test]
    fn test_render_exposed() {
        let response = SaveResponse {
            application: Some("welcome".to_string()),
            controller: Some("default".to_string()),
            functions: vec!["index".to_string(), "user".to_string()],
            ..SaveResponse::saved("h", "t")
        };
        let SaveReply::Saved { exposed, .. } = response.into_reply().unwrap() else {
            panic!("expected a saved reply");
        };

        assert_eq!(
            render_exposed(&exposed).unwrap(),
            "exposes  <a href=\"/welcome/default/index\">index</a>, <a href=\"/welcome/default/user\">user</a>"
        );
        assert_eq!(render_exposed(&[]), None);
    }

    #[test]
    fn test_serialization_skips_absent_fields() {
        let value = serde_json::to_value(SaveResponse::refused("nope", "/login")).unwrap();
        assert_eq!(
            value,
            json!({"error": "nope", "redirect": "/login", "functions": []})
        );
    }
}
