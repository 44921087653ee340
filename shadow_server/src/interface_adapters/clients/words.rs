use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::{WordProvider, WordProviderError};

#[derive(Debug, Serialize)]
struct SimilarWordRequest<'a> {
    base: &'a str,
    category: &'a str,
}

#[derive(Debug, Deserialize)]
struct SimilarWordResponse {
    #[serde(default)]
    word: Option<String>,
}

// Thin reqwest client for the word-similarity service.
#[derive(Clone)]
pub struct HttpWordProvider {
    http: reqwest::Client,
    base_url: String,
}

impl HttpWordProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl WordProvider for HttpWordProvider {
    async fn similar_word(
        &self,
        base: &str,
        category: &str,
    ) -> Result<Option<String>, WordProviderError> {
        let url = format!("{}/similar-word", self.base_url);
        let response = self
            .http
            .post(url)
            .json(&SimilarWordRequest { base, category })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WordProviderError::Timeout
                } else {
                    WordProviderError::Unavailable
                }
            })?;

        match response.status() {
            status if status.is_success() => {
                let body = response
                    .json::<SimilarWordResponse>()
                    .await
                    .map_err(|_| WordProviderError::InvalidResponse)?;
                Ok(body.word.filter(|word| !word.trim().is_empty()))
            }
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(WordProviderError::Unavailable),
        }
    }
}

// Used when no word service is configured; the static table covers everything.
#[derive(Clone, Copy, Default)]
pub struct NoWordService;

#[async_trait]
impl WordProvider for NoWordService {
    async fn similar_word(
        &self,
        _base: &str,
        _category: &str,
    ) -> Result<Option<String>, WordProviderError> {
        Ok(None)
    }
}
