//! HTMLページからの初期データ抽出
//!
//! 視聴ページ・チャンネルのライブページ・チャット埋め込みページに埋め込まれた
//! 値を正規表現で取り出す。

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use super::navigator::get_str;

const INITIAL_DATA_MARKERS: [&str; 2] = ["window[\"ytInitialData\"] = ", "var ytInitialData = "];
const INITIAL_DATA_END: &str = ";</script>";

// 正規表現のシングルトン（OnceLockで初回のみコンパイル）
static CHANNEL_ID_RE: OnceLock<Regex> = OnceLock::new();
static VIDEO_ID_RE: OnceLock<Regex> = OnceLock::new();
static IS_REPLAY_RE: OnceLock<Regex> = OnceLock::new();
static TOP_CHAT_CONTINUATION_RE: OnceLock<Regex> = OnceLock::new();
static ALL_CHAT_CONTINUATION_RE: OnceLock<Regex> = OnceLock::new();
static API_KEY_RE: OnceLock<Regex> = OnceLock::new();
static LEGACY_API_KEY_RE: OnceLock<Regex> = OnceLock::new();
static DATASYNC_ID_RE: OnceLock<Regex> = OnceLock::new();

fn get_channel_id_regex() -> &'static Regex {
    CHANNEL_ID_RE.get_or_init(|| {
        Regex::new(r#""channelId":"([^"]*)","isOwnerViewing""#)
            .expect("Failed to compile channelId regex")
    })
}

fn get_video_id_regex() -> &'static Regex {
    VIDEO_ID_RE.get_or_init(|| {
        Regex::new(r#""updatedMetadataEndpoint":\{"videoId":"([^"]*)"#)
            .expect("Failed to compile videoId regex")
    })
}

fn get_is_replay_regex() -> &'static Regex {
    IS_REPLAY_RE.get_or_init(|| {
        Regex::new(r#""isReplay":([^,}]*)"#).expect("Failed to compile isReplay regex")
    })
}

fn get_top_chat_continuation_regex() -> &'static Regex {
    TOP_CHAT_CONTINUATION_RE.get_or_init(|| {
        Regex::new(
            r#""selected":true,"continuation":\{"reloadContinuationData":\{"continuation":"([^"]*)"#,
        )
        .expect("Failed to compile top chat continuation regex")
    })
}

fn get_all_chat_continuation_regex() -> &'static Regex {
    ALL_CHAT_CONTINUATION_RE.get_or_init(|| {
        Regex::new(
            r#""selected":false,"continuation":\{"reloadContinuationData":\{"continuation":"([^"]*)"#,
        )
        .expect("Failed to compile all chat continuation regex")
    })
}

fn get_api_key_regex() -> &'static Regex {
    API_KEY_RE.get_or_init(|| {
        Regex::new(r#""innertubeApiKey"\s*:\s*"([^"]+)""#).expect("Failed to compile API key regex")
    })
}

fn get_legacy_api_key_regex() -> &'static Regex {
    LEGACY_API_KEY_RE.get_or_init(|| {
        Regex::new(r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#)
            .expect("Failed to compile legacy API key regex")
    })
}

fn get_datasync_id_regex() -> &'static Regex {
    DATASYNC_ID_RE.get_or_init(|| {
        Regex::new(r#""datasyncId":"([^|"]*)\|\|"#).expect("Failed to compile datasyncId regex")
    })
}

fn capture(re: &Regex, html: &str) -> Option<String> {
    re.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// 視聴ページの初期データ
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchPage {
    pub channel_id: Option<String>,
    pub video_id: Option<String>,
    pub is_replay: bool,
    pub continuation: Option<String>,
    pub api_key: Option<String>,
    pub datasync_id: Option<String>,
}

impl WatchPage {
    /// ページHTMLから初期データを抽出
    ///
    /// `top_chat_only`がfalseの場合は「すべてのチャット」のcontinuationを優先し、
    /// 見つからなければトップチャットのものを使う。
    pub fn parse(html: &str, top_chat_only: bool) -> Self {
        let mut continuation = capture(get_top_chat_continuation_regex(), html);
        if !top_chat_only {
            if let Some(all) = capture(get_all_chat_continuation_regex(), html) {
                continuation = Some(all);
            }
        }

        let page = Self {
            channel_id: capture(get_channel_id_regex(), html),
            video_id: capture(get_video_id_regex(), html),
            is_replay: capture(get_is_replay_regex(), html)
                .map(|v| v.trim() == "true")
                .unwrap_or(false),
            continuation,
            api_key: extract_api_key(html),
            datasync_id: capture(get_datasync_id_regex(), html),
        };

        log::debug!(
            "Parsed watch page: channel_id={:?}, video_id={:?}, is_replay={}, continuation={}, api_key={}, datasync_id={}",
            page.channel_id,
            page.video_id,
            page.is_replay,
            page.continuation.is_some(),
            page.api_key.is_some(),
            page.datasync_id.is_some()
        );
        page
    }
}

/// APIキーを抽出（`innertubeApiKey`、なければ`INNERTUBE_API_KEY`）
pub fn extract_api_key(html: &str) -> Option<String> {
    capture(get_api_key_regex(), html).or_else(|| capture(get_legacy_api_key_regex(), html))
}

/// ページに埋め込まれた`ytInitialData`をJSONとして取り出す
pub fn extract_initial_data(html: &str) -> Option<Value> {
    let (start, marker) = INITIAL_DATA_MARKERS
        .iter()
        .find_map(|marker| html.find(marker).map(|pos| (pos, *marker)))?;
    let rest = &html[start + marker.len()..];
    let end = rest.find(INITIAL_DATA_END)?;

    match serde_json::from_str(&rest[..end]) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Failed to parse ytInitialData: {}", e);
            None
        }
    }
}

/// チャット送信用パラメータを取得
pub fn send_params(initial_data: &Value) -> Option<&str> {
    get_str(
        initial_data,
        "/continuationContents/liveChatContinuation/actionPanel/liveChatMessageInputRenderer/sendButton/buttonRenderer/serviceEndpoint/sendLiveChatMessageEndpoint/params",
    )
}
