//! テスト用のインメモリトランスポートとフィクスチャ

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

use super::auth::Credentials;
use super::errors::TransportError;
use super::transport::{Headers, Transport};
use crate::config::{LIVE_CHAT_PAGE_URL, LIVE_CHAT_REPLAY_PAGE_URL, WATCH_PAGE_URL};

/// 記録されたリクエスト
#[derive(Debug, Clone)]
pub struct Request {
    pub url: String,
    pub headers: Headers,
    pub body: Option<Value>,
}

#[derive(Default)]
pub struct FakeTransport {
    /// URLの前方一致 → ページ本文
    pages: Mutex<Vec<(String, String)>>,
    json_responses: Mutex<VecDeque<Result<Value, TransportError>>>,
    /// post_jsonの戻り値
    pub post_result: bool,
    requests: Mutex<Vec<Request>>,
}

impl FakeTransport {
    pub fn with_page(self, url_prefix: &str, body: String) -> Self {
        self.set_page(url_prefix, body);
        self
    }

    /// ページを追加（同じ前方一致は置き換え）
    pub fn set_page(&self, url_prefix: &str, body: String) {
        let mut pages = self.pages.lock().unwrap();
        pages.retain(|(prefix, _)| prefix != url_prefix);
        pages.push((url_prefix.to_string(), body));
    }

    /// ページを取り除く（以降は404）
    pub fn remove_page(&self, url_prefix: &str) {
        self.pages.lock().unwrap().retain(|(prefix, _)| prefix != url_prefix);
    }

    /// fetch_jsonの応答を積む（空になった後は500を返す）
    pub fn push_json(&self, response: Result<Value, TransportError>) {
        self.json_responses.lock().unwrap().push_back(response);
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, url: &str, headers: &Headers, body: Option<&Value>) {
        self.requests.lock().unwrap().push(Request {
            url: url.to_string(),
            headers: headers.clone(),
            body: body.cloned(),
        });
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn fetch_text(&self, url: &str, headers: &Headers) -> Result<String, TransportError> {
        self.record(url, headers, None);
        self.pages
            .lock()
            .unwrap()
            .iter()
            .filter(|(prefix, _)| url.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, body)| body.clone())
            .ok_or(TransportError::Status(404))
    }

    async fn fetch_json(
        &self,
        url: &str,
        headers: &Headers,
        body: &Value,
    ) -> Result<Value, TransportError> {
        self.record(url, headers, Some(body));
        self.json_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(TransportError::Status(500)))
    }

    async fn post_json(
        &self,
        url: &str,
        headers: &Headers,
        body: &Value,
    ) -> Result<bool, TransportError> {
        self.record(url, headers, Some(body));
        Ok(self.post_result)
    }
}

// ========================================
// フィクスチャ
// ========================================

pub fn watch_html(is_replay: bool) -> String {
    format!(
        concat!(
            r#"<script>{{"videoDetails":{{"channelId":"UCchannel","isOwnerViewing":false}}}}</script>"#,
            r#"{{"isReplay":{},"subMenuItems":["#,
            r#"{{"selected":true,"continuation":{{"reloadContinuationData":{{"continuation":"top-token"}}}}}},"#,
            r#"{{"selected":false,"continuation":{{"reloadContinuationData":{{"continuation":"all-token"}}}}}}]}}"#,
            r#"ytcfg.set({{"innertubeApiKey":"AIzaTestKey1234","datasyncId":"ds-user||ds-other"}});"#
        ),
        is_replay
    )
}

pub fn text_action(id: &str, text: &str) -> Value {
    json!({"addChatItemAction": {"item": {"liveChatTextMessageRenderer": {
        "id": id,
        "message": {"runs": [{"text": text}]},
        "authorName": {"simpleText": "viewer"},
        "timestampUsec": "1703145600000000"
    }}}})
}

/// スーパーチャット本体と、それを内包するティッカー（同じID）
pub fn superchat_with_ticker(id: &str) -> Vec<Value> {
    let renderer = json!({"liveChatPaidMessageRenderer": {
        "id": id,
        "message": {"runs": [{"text": "thanks!"}]},
        "authorName": {"simpleText": "supporter"},
        "purchaseAmountText": {"simpleText": "¥500"},
        "timestampUsec": "1703145600000000"
    }});
    vec![
        json!({"addChatItemAction": {"item": renderer.clone()}}),
        json!({"addLiveChatTickerItemAction": {"item": {"liveChatTickerPaidMessageItemRenderer": {
            "id": format!("ticker-{}", id),
            "durationSec": 120,
            "fullDurationSec": 120,
            "showItemEndpoint": {"showLiveChatItemEndpoint": {"renderer": renderer}}
        }}}}),
    ]
}

pub fn chat_page_html(initial_data: Value) -> String {
    format!(
        r#"<html><script>window["ytInitialData"] = {};</script><script>other</script></html>"#,
        initial_data
    )
}

pub fn live_chat_page() -> String {
    chat_page_html(json!({"continuationContents": {"liveChatContinuation": {
        "continuations": [{"invalidationContinuationData": {"continuation": "live-next", "timeoutMs": 10000}}],
        "actions": [text_action("init1", "initial message")],
        "actionPanel": {"liveChatMessageInputRenderer": {"sendButton": {"buttonRenderer": {
            "serviceEndpoint": {"sendLiveChatMessageEndpoint": {"params": "send-params"}}
        }}}}
    }}}))
}

pub fn replay_chat_page() -> String {
    chat_page_html(json!({"continuationContents": {"liveChatContinuation": {
        "continuations": [{"liveChatReplayContinuationData": {"continuation": "replay-next"}}],
        "actions": [{"replayChatItemAction": {"actions": [text_action("r1", "replayed")]}}]
    }}}))
}

pub fn live_transport() -> FakeTransport {
    FakeTransport::default()
        .with_page(WATCH_PAGE_URL, watch_html(false))
        .with_page(LIVE_CHAT_PAGE_URL, live_chat_page())
}

pub fn replay_transport() -> FakeTransport {
    FakeTransport::default()
        .with_page(WATCH_PAGE_URL, watch_html(true))
        .with_page(LIVE_CHAT_REPLAY_PAGE_URL, replay_chat_page())
}

pub fn poll_response(actions: Value, continuations: Value) -> Value {
    json!({
        "responseContext": {
            "visitorData": "visitor-123",
            "serviceTrackingParams": [
                {"service": "CSI", "params": [{"key": "cver", "value": "2.20240501.01.00"}]}
            ]
        },
        "continuationContents": {"liveChatContinuation": {
            "continuations": continuations,
            "actions": actions
        }}
    })
}

pub fn menu_item(icon: &str, endpoint: &str, params: &str) -> Value {
    json!({"menuServiceItemRenderer": {
        "icon": {"iconType": icon},
        "serviceEndpoint": {endpoint: {"params": params}}
    }})
}

/// モデレーター権限で取得したコンテキストメニュー
pub fn moderator_menu() -> Value {
    json!({"liveChatItemContextMenuSupportedRenderers": {"menuRenderer": {"items": [
        menu_item("KEEP", "liveChatActionEndpoint", "pin-params"),
        menu_item("DELETE", "moderateLiveChatEndpoint", "delete-params"),
        menu_item("HOURGLASS", "moderateLiveChatEndpoint", "timeout-params"),
        menu_item("REMOVE_CIRCLE", "moderateLiveChatEndpoint", "ban-params"),
        menu_item("ADD_CIRCLE", "moderateLiveChatEndpoint", "unban-params"),
        menu_item("FLAG", "getReportFormEndpoint", "report-params"),
    ]}}})
}

pub fn credentials() -> Credentials {
    Credentials::new("sapisid", "hsid", "ssid", "apisid", "sid")
}
