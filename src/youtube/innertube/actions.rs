//! アクション列の走査
//!
//! 1つのアクションが複数の種類に該当しうるため、判定は排他ではなく独立に行う。

use serde_json::Value;

use super::message::decode_message;
use super::navigator::{get, get_array, get_str};
use super::parser::parse_chat_item;
use crate::youtube::types::{ChatBatch, ChatItemDelete, ChatItemKind};

/// アクション列をデコードしてバッファに追加する
///
/// バナーは1つだけ保持し、後から来たもので上書きする。
pub fn walk_actions(actions: &[Value], batch: &mut ChatBatch) {
    for action in actions {
        // リプレイ（アーカイブ）では内側にアクション列が入っている
        if let Some(inner) = get_array(action, "/replayChatItemAction/actions") {
            walk_actions(inner, batch);
        }

        if let Some(item) = get(action, "/addChatItemAction/item") {
            let chat_item = parse_chat_item(item);
            if chat_item.id.is_some() {
                batch.chat_items.push(chat_item);
            } else {
                log::trace!("Skipping chat item without id");
            }
        }

        if let Some(item) = get(action, "/addLiveChatTickerItemAction/item") {
            let chat_item = parse_chat_item(item);
            if chat_item.id.is_some()
                && matches!(chat_item.kind, ChatItemKind::TickerPaidMessage(_))
            {
                batch.ticker_paid_messages.push(chat_item);
            }
        }

        if let Some(contents) = get(
            action,
            "/addBannerToLiveChatCommand/bannerRenderer/liveChatBannerRenderer/contents",
        ) {
            let mut chat_item = parse_chat_item(contents);
            chat_item.kind = ChatItemKind::Banner;
            batch.banner_item = Some(chat_item);
        }

        if let Some(deleted) = get(action, "/markChatItemAsDeletedAction") {
            match get_str(deleted, "/targetItemId") {
                Some(target_id) => {
                    let message = get(deleted, "/deletedStateMessage")
                        .and_then(|m| decode_message(m).0);
                    batch.deletions.push(ChatItemDelete {
                        target_id: target_id.to_string(),
                        message,
                    });
                }
                None => log::debug!("Skipping delete action without targetItemId"),
            }
        }
    }
}
