//! ログイン済みブラウザセッションの認証情報
//!
//! チャット送信には5種類のCookieとSAPISIDHASH形式のAuthorizationヘッダーが必要。

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::collections::HashMap;

use super::transport::Headers;

/// セッションCookie（すべて不透明な文字列として扱う）
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub sapisid: String,
    pub hsid: String,
    pub ssid: String,
    pub apisid: String,
    pub sid: String,
}

impl Credentials {
    pub fn new(
        sapisid: impl Into<String>,
        hsid: impl Into<String>,
        ssid: impl Into<String>,
        apisid: impl Into<String>,
        sid: impl Into<String>,
    ) -> Self {
        Self {
            sapisid: sapisid.into(),
            hsid: hsid.into(),
            ssid: ssid.into(),
            apisid: apisid.into(),
            sid: sid.into(),
        }
    }

    /// ブラウザの開発者ツールからコピーした`Cookie`ヘッダー文字列から作成
    ///
    /// 5種類のうち1つでも欠けている場合はNone。
    pub fn from_cookie_header(cookie: &str) -> Option<Self> {
        let pairs: HashMap<&str, &str> = cookie
            .split(';')
            .filter_map(|pair| {
                let (key, value) = pair.split_once('=')?;
                Some((key.trim(), value.trim()))
            })
            .collect();

        let get = |key: &str| pairs.get(key).map(|v| v.to_string());
        Some(Self {
            sapisid: get("SAPISID")?,
            hsid: get("HSID")?,
            ssid: get("SSID")?,
            apisid: get("APISID")?,
            sid: get("SID")?,
        })
    }

    /// 5つすべてが設定されているか
    pub fn is_complete(&self) -> bool {
        [&self.sapisid, &self.hsid, &self.ssid, &self.apisid, &self.sid]
            .iter()
            .all(|v| !v.is_empty())
    }

    /// `SAPISIDHASH <unix>_<sha1hex>`形式のAuthorization値を生成
    pub fn sapisid_hash(&self, origin: &str, unix_time: i64) -> String {
        let mut hasher = Sha1::new();
        hasher.update(format!("{} {} {}", unix_time, self.sapisid, origin).as_bytes());
        format!("SAPISIDHASH {}_{}", unix_time, hex::encode(hasher.finalize()))
    }

    pub fn cookie_header(&self) -> String {
        format!(
            "SAPISID={}; HSID={}; SSID={}; APISID={}; SID={};",
            self.sapisid, self.hsid, self.ssid, self.apisid, self.sid
        )
    }

    /// 認証ヘッダー一式を生成
    pub fn auth_headers(&self, origin: &str, unix_time: i64) -> Headers {
        let mut headers = Headers::new();
        headers.insert(
            "Authorization".to_string(),
            self.sapisid_hash(origin, unix_time),
        );
        headers.insert("X-Origin".to_string(), origin.to_string());
        headers.insert("Origin".to_string(), origin.to_string());
        headers.insert("Cookie".to_string(), self.cookie_header());
        headers
    }
}

// Cookieの値をログに出さないためのDebug実装
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("complete", &self.is_complete())
            .finish()
    }
}
