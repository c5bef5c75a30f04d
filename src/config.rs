// =============================================================================
// 共通設定・定数モジュール
// =============================================================================
// ライブチャットクライアント全体で使用する設定値・定数を定義
// =============================================================================

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTPリクエストのデフォルトタイムアウト（秒）
///
/// ページ取得・InnerTube APIへのリクエストで使用。
/// コア側ではタイムアウトを課さず、トランスポート層でのみ適用する。
pub const HTTP_TIMEOUT_SECS: u64 = 10;

/// HTTPリクエストのデフォルトタイムアウト（Duration）
pub fn http_timeout() -> Duration {
    Duration::from_secs(HTTP_TIMEOUT_SECS)
}

/// デフォルトのUser-Agent
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36,gzip(gfe)";

/// 認証ヘッダーのOrigin
pub const YOUTUBE_ORIGIN: &str = "https://www.youtube.com";

pub const WATCH_PAGE_URL: &str = "https://www.youtube.com/watch?v=";
pub const CHANNEL_PAGE_URL: &str = "https://www.youtube.com/channel/";
pub const LIVE_CHAT_PAGE_URL: &str = "https://www.youtube.com/live_chat?continuation=";
pub const LIVE_CHAT_REPLAY_PAGE_URL: &str = "https://www.youtube.com/live_chat_replay?continuation=";

pub const LIVE_CHAT_API_URL: &str = "https://www.youtube.com/youtubei/v1/live_chat/get_live_chat";
pub const LIVE_CHAT_REPLAY_API_URL: &str =
    "https://www.youtube.com/youtubei/v1/live_chat/get_live_chat_replay";
pub const SEND_MESSAGE_API_URL: &str = "https://www.youtube.com/youtubei/v1/live_chat/send_message";
pub const CONTEXT_MENU_API_URL: &str =
    "https://www.youtube.com/youtubei/v1/live_chat/get_item_context_menu";

/// 削除・タイムアウト・BAN・BAN解除
pub const MODERATE_API_URL: &str = "https://studio.youtube.com/youtubei/v1/live_chat/moderate";
/// ピン留め
pub const LIVE_CHAT_ACTION_API_URL: &str =
    "https://studio.youtube.com/youtubei/v1/live_chat/live_chat_action";

/// チャット取得時の言語設定（gl / hl）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Locale {
    /// 国コード（例: "US", "JP"）
    pub country: String,
    /// 言語コード（例: "en", "ja"）
    pub language: String,
}

impl Locale {
    pub fn new(country: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            language: language.into(),
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::new("US", "en")
    }
}

/// セッション生成時のオプション
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LiveChatOptions {
    /// trueならトップチャットのみ、falseならすべてのチャット
    pub top_chat_only: bool,
    pub locale: Locale,
    pub user_agent: String,
    /// トランスポート層のタイムアウト（秒）
    pub timeout_secs: u64,
}

impl Default for LiveChatOptions {
    fn default() -> Self {
        Self {
            top_chat_only: true,
            locale: Locale::default(),
            user_agent: USER_AGENT.to_string(),
            timeout_secs: HTTP_TIMEOUT_SECS,
        }
    }
}

impl LiveChatOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_timeout_duration() {
        assert_eq!(http_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_default_options() {
        let options = LiveChatOptions::default();
        assert!(options.top_chat_only);
        assert_eq!(options.locale, Locale::new("US", "en"));
        assert_eq!(options.timeout(), Duration::from_secs(HTTP_TIMEOUT_SECS));
    }

    #[test]
    fn test_options_deserialize_partial() {
        // 省略したフィールドはデフォルト値で埋まる
        let options: LiveChatOptions =
            serde_json::from_str(r#"{"topChatOnly":false,"locale":{"country":"JP","language":"ja"}}"#)
                .unwrap();
        assert!(!options.top_chat_only);
        assert_eq!(options.locale.country, "JP");
        assert_eq!(options.user_agent, USER_AGENT);
    }
}
