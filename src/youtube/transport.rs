//! HTTPトランスポート
//!
//! セッション本体はこのトレイト越しにのみ通信する。タイムアウトはトランスポート側の責務。

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use super::errors::TransportError;
use crate::config::{http_timeout, USER_AGENT};

/// リクエストヘッダー
pub type Headers = HashMap<String, String>;

#[async_trait]
pub trait Transport: Send + Sync {
    /// GETでページ本文を取得（スクレイピング用）
    async fn fetch_text(&self, url: &str, headers: &Headers) -> Result<String, TransportError>;

    /// JSONをPOSTしてレスポンスのJSONを取得
    async fn fetch_json(
        &self,
        url: &str,
        headers: &Headers,
        body: &Value,
    ) -> Result<Value, TransportError>;

    /// JSONをPOSTして成否のみ返す（レスポンス本文は読まない）
    async fn post_json(
        &self,
        url: &str,
        headers: &Headers,
        body: &Value,
    ) -> Result<bool, TransportError>;
}

/// reqwestによるトランスポート実装
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// デフォルト設定（User-Agent・タイムアウト）で作成
    pub fn new() -> Result<Self, TransportError> {
        Self::with_config(USER_AGENT, http_timeout())
    }

    pub fn with_config(user_agent: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    fn apply_headers(
        &self,
        mut request: reqwest::RequestBuilder,
        headers: &Headers,
    ) -> reqwest::RequestBuilder {
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        request
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch_text(&self, url: &str, headers: &Headers) -> Result<String, TransportError> {
        log::debug!("GET {}", strip_query(url));

        let request = self
            .apply_headers(self.client.get(url), headers)
            .header("Accept-Charset", "utf-8");
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            log::error!("GET {} failed: {}", strip_query(url), status);
            return Err(TransportError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }

    async fn fetch_json(
        &self,
        url: &str,
        headers: &Headers,
        body: &Value,
    ) -> Result<Value, TransportError> {
        log::debug!("POST {}", strip_query(url));

        let response = self
            .apply_headers(self.client.post(url), headers)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            log::error!("POST {} failed: {} - {}", strip_query(url), status, text);
            return Err(TransportError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn post_json(
        &self,
        url: &str,
        headers: &Headers,
        body: &Value,
    ) -> Result<bool, TransportError> {
        log::debug!("POST {}", strip_query(url));

        let response = self
            .apply_headers(self.client.post(url), headers)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("POST {} returned {}", strip_query(url), status);
        }
        Ok(status.is_success())
    }
}

/// ログ出力用にクエリ文字列（APIキーを含む）を除去
fn strip_query(url: &str) -> &str {
    url.split_once('?').map(|(path, _)| path).unwrap_or(url)
}
