// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::api::{ErrorResponse, OPERATOR_HEADER};
use anyhow::{anyhow, Context, Result};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Thin HTTP client for the operator routes.
pub struct LedgerClient {
    http: Client,
    base_url: String,
    operator_key: Option<String>,
}

impl LedgerClient {
    pub fn new(base_url: &str, operator_key: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            operator_key,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);
        let builder = self.http.request(method, url);
        match &self.operator_key {
            Some(key) => builder.header(OPERATOR_HEADER, key),
            None => builder,
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        Self::finish(self.request(Method::GET, path)).await
    }

    pub async fn patch<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        Self::finish(self.request(Method::PATCH, path).json(body)).await
    }

    async fn finish<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let response = request.send().await.context("Ledger API unreachable")?;
        let status = response.status();

        if status.is_success() {
            return response
                .json::<T>()
                .await
                .context("Unexpected response body");
        }

        match response.json::<ErrorResponse>().await {
            Ok(err) => Err(anyhow!("{} ({}): {}", status, err.error_type, err.message)),
            Err(_) => Err(anyhow!("Request failed with status {}", status)),
        }
    }
}
