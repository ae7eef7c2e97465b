//! Blocking HTTP implementation of the backend API

use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{AccountMapping, ImportApi, StatementFile};
use crate::config::Settings;
use crate::error::{ImportError, ImportResult};
use crate::models::{
    Account, Category, CommitRequest, CommitResponse, ImportPreviewResponse, Subscription,
    SuggestRequest, SuggestResponse,
};

pub struct HttpImportApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpImportApi {
    pub fn new(settings: &Settings) -> ImportResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| ImportError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            token: settings
                .api_token
                .clone()
                .filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> ImportResult<T> {
        self.send(self.client.get(self.url(path)))
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> ImportResult<T> {
        self.send(self.client.post(self.url(path)).json(body))
    }

    fn send<T: DeserializeOwned>(&self, mut request: RequestBuilder) -> ImportResult<T> {
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send()?;
        let response = check_status(response)?;
        Ok(response.json()?)
    }
}

/// Turn a non-2xx response into `ImportError::Api`
fn check_status(response: Response) -> ImportResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let body = response.text().unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });
    warn!(status = status.as_u16(), %url, %message, "backend rejected request");
    Err(ImportError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Pull a human message out of an error body
///
/// Accepts `{"detail": ...}`, `{"message": ...}` or `{"error": ...}`. A
/// `detail` list (validation errors) is joined by its `msg` entries. Plain
/// text bodies are used as-is.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return Some(body.to_string());
    };
    ["detail", "message", "error"]
        .iter()
        .filter_map(|key| json.get(key))
        .find_map(message_from_value)
}

fn message_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(|item| match item {
                    Value::Object(_) => item.get("msg").and_then(message_from_value),
                    other => message_from_value(other),
                })
                .collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        Value::Object(_) => value.get("message").and_then(message_from_value),
        _ => None,
    }
}

impl ImportApi for HttpImportApi {
    #[tracing::instrument(skip_all)]
    fn accounts(&self) -> ImportResult<Vec<Account>> {
        self.get_json("accounts")
    }

    #[tracing::instrument(skip_all)]
    fn categories(&self) -> ImportResult<Vec<Category>> {
        self.get_json("categories")
    }

    #[tracing::instrument(skip_all)]
    fn subscriptions(&self) -> ImportResult<Vec<Subscription>> {
        self.get_json("subscriptions")
    }

    #[tracing::instrument(skip_all, fields(files = files.len()))]
    fn preview(
        &self,
        files: &[StatementFile],
        mapping: &AccountMapping,
    ) -> ImportResult<ImportPreviewResponse> {
        let mut form = Form::new().text("mapping", serde_json::to_string(mapping)?);
        for file in files {
            let part = Part::bytes(file.bytes.clone()).file_name(file.name.clone());
            form = form.part("files", part);
        }
        debug!(bytes = files.iter().map(|f| f.bytes.len()).sum::<usize>(), "uploading statements");
        self.send(self.client.post(self.url("imports/preview")).multipart(form))
    }

    #[tracing::instrument(skip_all, fields(rows = request.rows.len()))]
    fn suggest(&self, request: &SuggestRequest) -> ImportResult<SuggestResponse> {
        self.post_json("imports/suggest", request)
    }

    #[tracing::instrument(skip_all, fields(rows = request.rows.len()))]
    fn commit(&self, request: &CommitRequest) -> ImportResult<CommitResponse> {
        self.post_json("imports/commit", request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base_url: &str) -> HttpImportApi {
        let settings = Settings {
            api_base_url: base_url.to_string(),
            request_timeout_secs: 2,
            ..Settings::default()
        };
        HttpImportApi::new(&settings).unwrap()
    }

    #[test]
    fn test_url_building() {
        let api = api("http://localhost:8000/api/");
        assert_eq!(api.base_url(), "http://localhost:8000/api");
        assert_eq!(
            api.url("/imports/preview"),
            "http://localhost:8000/api/imports/preview"
        );
        assert_eq!(api.url("accounts"), "http://localhost:8000/api/accounts");
    }

    #[test]
    fn test_blank_token_ignored() {
        let settings = Settings {
            api_token: Some("  ".into()),
            ..Settings::default()
        };
        let api = HttpImportApi::new(&settings).unwrap();
        assert!(api.token.is_none());
    }

    #[test]
    fn test_error_message_fields() {
        assert_eq!(
            error_message(r#"{"detail": "Unsupported file type"}"#).as_deref(),
            Some("Unsupported file type")
        );
        assert_eq!(
            error_message(r#"{"message": "Account archived"}"#).as_deref(),
            Some("Account archived")
        );
        assert_eq!(
            error_message(r#"{"error": {"message": "quota exceeded"}}"#).as_deref(),
            Some("quota exceeded")
        );
    }

    #[test]
    fn test_error_message_validation_list() {
        let body = r#"{"detail": [{"loc": ["body", "rows", 0], "msg": "field required"},
                                  {"loc": ["body"], "msg": "bad date"}]}"#;
        assert_eq!(
            error_message(body).as_deref(),
            Some("field required; bad date")
        );
    }

    #[test]
    fn test_error_message_fallbacks() {
        assert_eq!(error_message("").as_deref(), None);
        assert_eq!(error_message(r#"{"status": 500}"#).as_deref(), None);
        assert_eq!(
            error_message("Bad Gateway\n").as_deref(),
            Some("Bad Gateway")
        );
    }

    #[test]
    fn test_unreachable_server_is_network_error() {
        let api = api("http://127.0.0.1:9");
        let err = api.accounts().unwrap_err();
        assert!(matches!(err, ImportError::Network(_)));
        assert!(err.is_api());
    }
}
