//! Client side of the MIDI transformation service.
//!
//! The service is an opaque `bytes -> bytes` function behind HTTP: the raw
//! file goes up as the multipart field `file`, the transformed file comes
//! back as the response body. Failures are reported as a JSON object with an
//! `error` message, sometimes even under a success status.

use reqwest::blocking::{Client, multipart};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;

use crate::error::{SettingsError, TransformError};
use crate::settings::ServiceSettings;

pub trait TransformService: Send + Sync {
    fn transform(&self, file_name: &str, data: &[u8]) -> Result<Vec<u8>, TransformError>;
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Deserialize)]
struct ErrorPayload {
    error: Option<String>,
}

pub struct HttpTransformService {
    client: Client,
    process_url: String,
    health_url: String,
}

impl HttpTransformService {
    pub fn new(settings: &ServiceSettings) -> Result<Self, SettingsError> {
        let base = settings.base_url.trim_end_matches('/');
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(SettingsError::InvalidUrl(settings.base_url.clone()));
        }

        let client = Client::builder().timeout(settings.timeout()).build()?;

        Ok(Self {
            client,
            process_url: format!("{}{}", base, settings.process_path),
            health_url: format!("{}{}", base, settings.health_path),
        })
    }

    pub fn process_url(&self) -> &str {
        &self.process_url
    }

    pub fn health(&self) -> Result<ServiceHealth, TransformError> {
        let response = self
            .client
            .get(&self.health_url)
            .send()
            .map_err(transport_error)?;
        let status = response.status();
        let body = response.bytes().map_err(transport_error)?;

        if !status.is_success() {
            return Err(TransformError::Service(format!(
                "Server error: {}",
                status.as_u16()
            )));
        }
        serde_json::from_slice(&body)
            .map_err(|e| TransformError::Service(format!("Invalid health response: {}", e)))
    }
}

impl TransformService for HttpTransformService {
    fn transform(&self, file_name: &str, data: &[u8]) -> Result<Vec<u8>, TransformError> {
        let part = multipart::Part::bytes(data.to_vec())
            .file_name(file_name.to_string())
            .mime_str("audio/midi")
            .map_err(transport_error)?;
        let form = multipart::Form::new().part("file", part);

        tracing::debug!("POST {} ({} bytes)", self.process_url, data.len());
        let response = self
            .client
            .post(&self.process_url)
            .multipart(form)
            .send()
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/json"));
        let body = response.bytes().map_err(transport_error)?;

        interpret_response(status, is_json, &body)
    }
}

fn transport_error(err: reqwest::Error) -> TransformError {
    if err.is_timeout() {
        TransformError::TimedOut
    } else {
        TransformError::Transport(err.to_string())
    }
}

/// Turns a finished HTTP exchange into the transformed bytes or the error
/// message to show.
pub fn interpret_response(
    status: u16,
    is_json: bool,
    body: &[u8],
) -> Result<Vec<u8>, TransformError> {
    let reported = || {
        serde_json::from_slice::<ErrorPayload>(body)
            .ok()
            .and_then(|p| p.error)
            .filter(|msg| !msg.is_empty())
    };

    if (200..300).contains(&status) {
        if is_json {
            if let Some(message) = reported() {
                return Err(TransformError::Service(message));
            }
        }
        return Ok(body.to_vec());
    }

    Err(TransformError::Service(
        reported().unwrap_or_else(|| format!("Server error: {}", status)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_body_is_passed_through() {
        let body = b"MThd\x00\x00\x00\x06";
        assert_eq!(interpret_response(200, false, body).unwrap(), body.to_vec());
    }

    #[test]
    fn structured_error_is_surfaced_verbatim() {
        let err = interpret_response(500, true, br#"{"error": "bad format"}"#).unwrap_err();
        assert_eq!(err, TransformError::Service("bad format".into()));
    }

    #[test]
    fn unstructured_error_falls_back_to_status() {
        let err = interpret_response(502, false, b"<html>Bad Gateway</html>").unwrap_err();
        assert_eq!(err, TransformError::Service("Server error: 502".into()));

        let err = interpret_response(500, true, br#"{"detail": "oops"}"#).unwrap_err();
        assert_eq!(err, TransformError::Service("Server error: 500".into()));
    }

    #[test]
    fn error_payload_under_success_status_is_an_error() {
        let err = interpret_response(200, true, br#"{"error": "Could not decode MIDI"}"#)
            .unwrap_err();
        assert_eq!(err, TransformError::Service("Could not decode MIDI".into()));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let settings = ServiceSettings {
            base_url: "localhost:7860".into(),
            ..ServiceSettings::default()
        };
        assert!(matches!(
            HttpTransformService::new(&settings),
            Err(SettingsError::InvalidUrl(_))
        ));
    }
}
