use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// デコード済みチャットアイテム
///
/// テキスト・スーパーチャット・ステッカー・メンバーシップ・システムメッセージ・
/// ピン留めバナーを共通の形で表す。種別固有のデータは`kind`に入る。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatItem {
    /// YouTube側が割り当てるID（重複排除・削除対象の照合に使う）
    pub id: Option<String>,
    pub kind: ChatItemKind,
    pub author_name: Option<String>,
    pub author_channel_id: Option<String>,
    pub author_icon_url: Option<String>,
    pub author_roles: BTreeSet<AuthorRole>,
    /// メンバーバッジのURL（`AuthorRole::Member`の場合のみ）
    pub member_badge_icon_url: Option<String>,
    /// 表示用テキスト。テキストを生成するrunが1つもなければNone
    pub message: Option<String>,
    pub rich_content: Vec<MessageRun>,
    /// 投稿時刻（UNIXエポックからのマイクロ秒）
    pub timestamp_micros: Option<i64>,
    /// コンテキストメニュー取得用のパラメータ（モデレーター向け）
    pub context_menu_params: Option<String>,
    /// コンテキストメニューから取得済みのモデレーション用パラメータ
    #[serde(default)]
    pub moderation_params: ModerationParams,
}

impl ChatItem {
    /// 投稿時刻をDateTimeとして取得
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp_micros
            .and_then(|usec| Utc.timestamp_micros(usec).single())
    }

    pub fn has_role(&self, role: AuthorRole) -> bool {
        self.author_roles.contains(&role)
    }

    pub fn is_author_owner(&self) -> bool {
        self.has_role(AuthorRole::Owner)
    }

    pub fn is_author_moderator(&self) -> bool {
        self.has_role(AuthorRole::Moderator)
    }

    pub fn is_author_member(&self) -> bool {
        self.has_role(AuthorRole::Member)
    }

    pub fn is_author_verified(&self) -> bool {
        self.has_role(AuthorRole::Verified)
    }
}

/// チャットアイテムの種別
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChatItemKind {
    #[default]
    TextMessage,
    PaidMessage(PaidMessage),
    PaidSticker(PaidSticker),
    TickerPaidMessage(TickerPaidMessage),
    NewMemberMessage,
    /// YouTubeからのシステムメッセージ（「ようこそ」等）
    EngagementMessage,
    /// ピン留めされたメッセージ
    Banner,
}

/// スーパーチャット固有の情報（色はARGB）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaidMessage {
    pub header_background_color: Option<u32>,
    pub header_text_color: Option<u32>,
    pub body_background_color: Option<u32>,
    pub body_text_color: Option<u32>,
    pub author_name_text_color: Option<u32>,
    /// 金額の表示文字列（例: "¥1,000"）
    pub purchase_amount: Option<String>,
}

/// スーパーステッカー固有の情報
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaidSticker {
    pub background_color: Option<u32>,
    pub purchase_amount: Option<String>,
    pub sticker_icon_url: Option<String>,
}

/// ティッカー（画面上部に一定時間表示されるスーパーチャット）
///
/// 内側のアイテムは必ずティッカー以外（入れ子は1段のみ）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerPaidMessage {
    pub item: Box<ChatItem>,
    pub end_background_color: Option<u32>,
    /// 表示開始からの経過秒数
    pub duration_sec: Option<u32>,
    /// 表示される合計秒数
    pub full_duration_sec: Option<u32>,
}

/// 投稿者の属性（複数同時に付与されうる）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthorRole {
    Verified,
    Owner,
    Moderator,
    Member,
}

/// メッセージを構成する要素（テキストまたは絵文字）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MessageRun {
    Text { text: String },
    Emoji { emoji: Emoji },
}

/// 絵文字情報
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Emoji {
    pub emoji_id: Option<String>,
    /// 先頭のショートカットが表示テキスト中のプレースホルダーになる
    pub shortcuts: Vec<String>,
    pub search_terms: Vec<String>,
    pub icon_url: Option<String>,
    pub is_custom_emoji: bool,
}

/// モデレーション操作ごとのパラメータ
///
/// チャットアイテムのコンテキストメニューから取得する。権限がない操作はNone。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationParams {
    pub pin_to_top: Option<String>,
    pub delete: Option<String>,
    pub time_ban: Option<String>,
    pub user_ban: Option<String>,
    pub user_unban: Option<String>,
}

/// 配信の状態（視聴ページの`liveBroadcastDetails`）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveBroadcastDetails {
    pub is_live_now: Option<bool>,
    /// ISO 8601形式の開始時刻
    pub start_timestamp: Option<String>,
    /// ISO 8601形式の終了時刻（配信中はNone）
    pub end_timestamp: Option<String>,
}

impl LiveBroadcastDetails {
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        parse_rfc3339(self.start_timestamp.as_deref()?)
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        parse_rfc3339(self.end_timestamp.as_deref()?)
    }
}

fn parse_rfc3339(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// チャット削除通知
///
/// ローカルのバッファ内容とは照合しない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatItemDelete {
    pub target_id: String,
    /// 置き換え表示用のメッセージ（例: "[message retracted]"）
    pub message: Option<String>,
}

/// 1回のポーリングで得られたデータ一式
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatBatch {
    pub chat_items: Vec<ChatItem>,
    pub ticker_paid_messages: Vec<ChatItem>,
    pub deletions: Vec<ChatItemDelete>,
    pub banner_item: Option<ChatItem>,
}

impl ChatBatch {
    pub fn is_empty(&self) -> bool {
        self.chat_items.is_empty()
            && self.ticker_paid_messages.is_empty()
            && self.deletions.is_empty()
            && self.banner_item.is_none()
    }
}
