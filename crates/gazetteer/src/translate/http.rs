//! Google Cloud Translation v2 backend.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{TranslationError, TranslationProvider};

const DEFAULT_ENDPOINT: &str = "https://translation.googleapis.com/language/translate/v2";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(4);

/// Environment variable [`HttpTranslator::from_env`] reads the API key from.
pub const API_KEY_ENV: &str = "GOOGLE_TRANSLATE_API_KEY";

/// [`TranslationProvider`] backed by the Google Translation REST API.
///
/// Requests are synchronous with a short timeout; the search pipeline treats
/// translation as best-effort and a slow provider must not stall searches
/// indefinitely.
pub struct HttpTranslator {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
}

impl HttpTranslator {
    pub fn new(api_key: impl Into<String>) -> Result<Self, TranslationError> {
        Self::builder().api_key(api_key).build()
    }

    /// Build a translator from [`API_KEY_ENV`], failing with
    /// [`TranslationError::Unavailable`] when it is unset or empty.
    pub fn from_env() -> Result<Self, TranslationError> {
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Self::new(key),
            _ => Err(TranslationError::Unavailable),
        }
    }

    #[must_use]
    pub fn builder() -> HttpTranslatorBuilder {
        HttpTranslatorBuilder::default()
    }

    fn request(
        &self,
        texts: &[String],
        target: &str,
        source: Option<&str>,
    ) -> Result<Vec<String>, TranslationError> {
        let body = TranslateRequest { q: texts, target, format: "text", source };
        debug!(count = texts.len(), target, source = source.unwrap_or("auto"), "Translating");

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|error| TranslationError::Failed(error.to_string()))?;
        let payload: TranslateResponse = response
            .json()
            .map_err(|error| TranslationError::Failed(error.to_string()))?;

        let translations: Vec<String> = payload
            .data
            .translations
            .into_iter()
            .map(|t| t.translated_text)
            .collect();
        if translations.len() != texts.len() {
            return Err(TranslationError::Failed(format!(
                "expected {} translations, got {}",
                texts.len(),
                translations.len()
            )));
        }
        Ok(translations)
    }
}

impl TranslationProvider for HttpTranslator {
    fn translate(
        &self,
        text: &str,
        target: &str,
        source: Option<&str>,
    ) -> Result<String, TranslationError> {
        self.request(&[text.to_owned()], target, source)?
            .into_iter()
            .next()
            .ok_or_else(|| TranslationError::Failed("empty response".to_owned()))
    }

    fn translate_batch(
        &self,
        texts: &[String],
        target: &str,
        source: Option<&str>,
    ) -> Result<Vec<String>, TranslationError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts, target, source)
    }
}

#[derive(Debug, Default)]
pub struct HttpTranslatorBuilder {
    api_key: Option<String>,
    endpoint: Option<String>,
    timeout: Option<Duration>,
}

impl HttpTranslatorBuilder {
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Override the API endpoint, mainly for tests against a local stub.
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<HttpTranslator, TranslationError> {
        let api_key = match self.api_key {
            Some(key) if !key.trim().is_empty() => key,
            _ => return Err(TranslationError::Unavailable),
        };
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .map_err(|error| TranslationError::Failed(error.to_string()))?;
        Ok(HttpTranslator {
            client,
            endpoint: self.endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned()),
            api_key,
        })
    }
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a [String],
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslationList,
}

#[derive(Debug, Deserialize)]
struct TranslationList {
    translations: Vec<TranslationItem>,
}

#[derive(Debug, Deserialize)]
struct TranslationItem {
    #[serde(rename = "translatedText")]
    translated_text: String,
}
