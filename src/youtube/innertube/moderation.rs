//! モデレーション操作（削除・タイムアウト・BAN・ピン留め）
//!
//! 操作に必要なパラメータはチャットアイテムごとのコンテキストメニューにしか
//! 含まれないため、`get_item_context_menu`の応答からアイコン種別で振り分ける。

use serde_json::Value;

use super::navigator::{get, get_array, get_str};
use crate::config::{LIVE_CHAT_ACTION_API_URL, MODERATE_API_URL};
use crate::youtube::types::ModerationParams;

const MENU_ITEMS_PATH: &str = "/liveChatItemContextMenuSupportedRenderers/menuRenderer/items";
const MODERATE_PARAMS_PATH: &str = "/serviceEndpoint/moderateLiveChatEndpoint/params";
const ACTION_PARAMS_PATH: &str = "/serviceEndpoint/liveChatActionEndpoint/params";

/// モデレーション操作の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationAction {
    /// チャットを削除
    Delete,
    /// 投稿者を一時的にタイムアウト
    TimeBan,
    /// 投稿者を永久にBAN
    Ban,
    /// BANを解除
    Unban,
    /// チャットを上部に固定
    Pin,
}

impl ModerationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationAction::Delete => "delete",
            ModerationAction::TimeBan => "time ban",
            ModerationAction::Ban => "ban",
            ModerationAction::Unban => "unban",
            ModerationAction::Pin => "pin",
        }
    }

    /// 送信先のエンドポイント（ピン留めのみ別）
    pub fn endpoint(&self) -> &'static str {
        match self {
            ModerationAction::Pin => LIVE_CHAT_ACTION_API_URL,
            _ => MODERATE_API_URL,
        }
    }

    pub fn params<'a>(&self, params: &'a ModerationParams) -> Option<&'a str> {
        let value = match self {
            ModerationAction::Delete => &params.delete,
            ModerationAction::TimeBan => &params.time_ban,
            ModerationAction::Ban => &params.user_ban,
            ModerationAction::Unban => &params.user_unban,
            ModerationAction::Pin => &params.pin_to_top,
        };
        value.as_deref()
    }
}

/// コンテキストメニューの応答からモデレーション用パラメータを取り出す
///
/// 権限のない操作はメニューに含まれないためNoneのまま。
/// 通報・モデレーター追加などの項目は無視する。
pub fn parse_context_menu(response: &Value) -> ModerationParams {
    let mut params = ModerationParams::default();
    let Some(items) = get_array(response, MENU_ITEMS_PATH) else {
        return params;
    };

    for item in items {
        let Some(renderer) = get(item, "/menuServiceItemRenderer") else {
            continue;
        };
        let moderate = || get_str(renderer, MODERATE_PARAMS_PATH).map(str::to_string);

        match get_str(renderer, "/icon/iconType") {
            Some("KEEP") => {
                params.pin_to_top = get_str(renderer, ACTION_PARAMS_PATH).map(str::to_string)
            }
            Some("DELETE") => params.delete = moderate(),
            Some("HOURGLASS") => params.time_ban = moderate(),
            Some("REMOVE_CIRCLE") => params.user_ban = moderate(),
            Some("ADD_CIRCLE") => params.user_unban = moderate(),
            _ => {}
        }
    }

    params
}
