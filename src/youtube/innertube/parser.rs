//! InnerTube チャットアイテムのデコード
//!
//! レンダラーの種類は排他ではない（ティッカーは別のレンダラーを内包する）ため、
//! 共通部分をデコードしてから種別ごとのフィールドを重ねる。

use serde_json::Value;
use std::collections::BTreeSet;

use super::message::{decode_message, largest_thumbnail_at};
use super::navigator::{get, get_i64, get_str, get_u32};
use crate::youtube::types::{
    AuthorRole, ChatItem, ChatItemKind, PaidMessage, PaidSticker, TickerPaidMessage,
};

const TEXT_MESSAGE_RENDERER: &str = "liveChatTextMessageRenderer";
const PAID_MESSAGE_RENDERER: &str = "liveChatPaidMessageRenderer";
const PAID_STICKER_RENDERER: &str = "liveChatPaidStickerRenderer";
const MEMBERSHIP_ITEM_RENDERER: &str = "liveChatMembershipItemRenderer";
const ENGAGEMENT_MESSAGE_RENDERER: &str = "liveChatViewerEngagementMessageRenderer";
const TICKER_PAID_MESSAGE_RENDERER: &str = "liveChatTickerPaidMessageItemRenderer";

/// システムメッセージの投稿者名
pub const SYSTEM_AUTHOR_NAME: &str = "YouTube";
/// システムメッセージの投稿者チャンネルID
pub const SYSTEM_AUTHOR_CHANNEL_ID: &str = "user/YouTube";

/// アイテムノード（`addChatItemAction.item`等）をChatItemに変換
///
/// 既知のレンダラーが1つもない場合も空のChatItemを返す（idなしとして
/// 呼び出し側で捨てられる）。
pub fn parse_chat_item(item: &Value) -> ChatItem {
    parse_item(item, true)
}

/// `allow_ticker`がfalseの場合、ティッカーの展開を行わない（入れ子は1段のみ）
fn parse_item(item: &Value, allow_ticker: bool) -> ChatItem {
    let mut chat_item = ChatItem::default();

    // テキスト・スーパーチャット・ステッカー・メンバーシップは共通の形を持つ
    let base = [
        TEXT_MESSAGE_RENDERER,
        PAID_MESSAGE_RENDERER,
        PAID_STICKER_RENDERER,
        MEMBERSHIP_ITEM_RENDERER,
    ]
    .iter()
    .find_map(|key| item.get(*key));

    if let Some(renderer) = base {
        parse_base_fields(&mut chat_item, renderer);
    }

    if let Some(renderer) = item.get(ENGAGEMENT_MESSAGE_RENDERER) {
        parse_engagement_message(&mut chat_item, renderer);
    }

    if let Some(renderer) = item.get(PAID_MESSAGE_RENDERER) {
        chat_item.kind = ChatItemKind::PaidMessage(parse_paid_message(renderer));
    }

    if let Some(renderer) = item.get(PAID_STICKER_RENDERER) {
        chat_item.kind = ChatItemKind::PaidSticker(parse_paid_sticker(renderer));
    }

    if allow_ticker {
        if let Some(renderer) = item.get(TICKER_PAID_MESSAGE_RENDERER) {
            chat_item = parse_ticker(renderer);
        }
    }

    if let Some(renderer) = item.get(MEMBERSHIP_ITEM_RENDERER) {
        let (message, rich_content) = get(renderer, "/headerSubtext")
            .map(decode_message)
            .unwrap_or_default();
        chat_item.message = message;
        chat_item.rich_content = rich_content;
        chat_item.kind = ChatItemKind::NewMemberMessage;
    }

    chat_item
}

/// 共通フィールド（投稿者・本文・時刻・バッジ）をデコード
fn parse_base_fields(chat_item: &mut ChatItem, renderer: &Value) {
    chat_item.author_name = get_str(renderer, "/authorName/simpleText").map(str::to_string);
    chat_item.id = get_str(renderer, "/id").map(str::to_string);
    chat_item.author_channel_id =
        get_str(renderer, "/authorExternalChannelId").map(str::to_string);

    if let Some(message) = get(renderer, "/message") {
        let (text, rich_content) = decode_message(message);
        chat_item.message = text;
        chat_item.rich_content = rich_content;
    }

    chat_item.author_icon_url = largest_thumbnail_at(renderer, "/authorPhoto/thumbnails");
    chat_item.timestamp_micros = parse_timestamp(renderer);

    let (roles, member_badge_icon_url) = parse_author_badges(renderer);
    chat_item.author_roles = roles;
    chat_item.member_badge_icon_url = member_badge_icon_url;

    chat_item.context_menu_params = get_str(
        renderer,
        "/contextMenuEndpoint/liveChatItemContextMenuEndpoint/params",
    )
    .map(str::to_string);
}

/// システムメッセージ（投稿者はYouTube固定、バッジなし）
fn parse_engagement_message(chat_item: &mut ChatItem, renderer: &Value) {
    chat_item.author_name = Some(SYSTEM_AUTHOR_NAME.to_string());
    chat_item.author_channel_id = Some(SYSTEM_AUTHOR_CHANNEL_ID.to_string());
    chat_item.author_roles.clear();
    chat_item.member_badge_icon_url = None;
    chat_item.id = get_str(renderer, "/id").map(str::to_string);

    let (message, rich_content) = get(renderer, "/message")
        .map(decode_message)
        .unwrap_or_default();
    chat_item.message = message;
    chat_item.rich_content = rich_content;
    chat_item.timestamp_micros = parse_timestamp(renderer);
    chat_item.kind = ChatItemKind::EngagementMessage;
}

fn parse_paid_message(renderer: &Value) -> PaidMessage {
    PaidMessage {
        header_background_color: get_u32(renderer, "/headerBackgroundColor"),
        header_text_color: get_u32(renderer, "/headerTextColor"),
        body_background_color: get_u32(renderer, "/bodyBackgroundColor"),
        body_text_color: get_u32(renderer, "/bodyTextColor"),
        author_name_text_color: get_u32(renderer, "/authorNameTextColor"),
        purchase_amount: get_str(renderer, "/purchaseAmountText/simpleText").map(str::to_string),
    }
}

fn parse_paid_sticker(renderer: &Value) -> PaidSticker {
    PaidSticker {
        background_color: get_u32(renderer, "/backgroundColor"),
        purchase_amount: get_str(renderer, "/purchaseAmountText/simpleText").map(str::to_string),
        sticker_icon_url: largest_thumbnail_at(renderer, "/sticker/thumbnails"),
    }
}

/// ティッカーをデコード
///
/// 内包されたレンダラーを通常アイテムとしてデコードし、その共通フィールドを
/// 外側にも持たせる。内側のidがない場合はティッカー自身のidを使う。
fn parse_ticker(renderer: &Value) -> ChatItem {
    let inner = get(renderer, "/showItemEndpoint/showLiveChatItemEndpoint/renderer")
        .map(|node| parse_item(node, false))
        .unwrap_or_default();

    let mut outer = inner.clone();
    if outer.id.is_none() {
        outer.id = get_str(renderer, "/id").map(str::to_string);
    }
    if outer.author_channel_id.is_none() {
        outer.author_channel_id =
            get_str(renderer, "/authorExternalChannelId").map(str::to_string);
    }
    if outer.author_icon_url.is_none() {
        outer.author_icon_url = largest_thumbnail_at(renderer, "/authorPhoto/thumbnails");
    }

    outer.kind = ChatItemKind::TickerPaidMessage(TickerPaidMessage {
        item: Box::new(inner),
        end_background_color: get_u32(renderer, "/endBackgroundColor"),
        duration_sec: get_u32(renderer, "/durationSec"),
        full_duration_sec: get_u32(renderer, "/fullDurationSec"),
    });
    outer
}

/// 投稿者バッジから属性を判定
///
/// カスタムサムネイルを持つバッジはアイコン種別と無関係にメンバー扱い。
fn parse_author_badges(renderer: &Value) -> (BTreeSet<AuthorRole>, Option<String>) {
    let mut roles = BTreeSet::new();
    let mut member_badge_icon_url = None;

    let Some(badges) = get(renderer, "/authorBadges").and_then(Value::as_array) else {
        return (roles, member_badge_icon_url);
    };

    for badge in badges {
        let Some(badge_renderer) = badge.get("liveChatAuthorBadgeRenderer") else {
            continue;
        };
        match get_str(badge_renderer, "/icon/iconType") {
            Some("VERIFIED") => {
                roles.insert(AuthorRole::Verified);
            }
            Some("OWNER") => {
                roles.insert(AuthorRole::Owner);
            }
            Some("MODERATOR") => {
                roles.insert(AuthorRole::Moderator);
            }
            _ => {}
        }
        if badge_renderer.get("customThumbnail").is_some() {
            roles.insert(AuthorRole::Member);
            member_badge_icon_url =
                largest_thumbnail_at(badge_renderer, "/customThumbnail/thumbnails");
        }
    }

    (roles, member_badge_icon_url)
}

/// タイムスタンプ（マイクロ秒、文字列）をパース
/// 頻繁に呼ばれるため、パース失敗時のログはdebugレベル
fn parse_timestamp(renderer: &Value) -> Option<i64> {
    let usec = get_i64(renderer, "/timestampUsec");
    if usec.is_none() && get(renderer, "/timestampUsec").is_some() {
        log::debug!(
            "Failed to parse timestampUsec: {:?}",
            get(renderer, "/timestampUsec")
        );
    }
    usec
}
