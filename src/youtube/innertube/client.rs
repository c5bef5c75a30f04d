//! InnerTube ライブチャットセッション
//!
//! 初期化（ページ取得）→ ポーリング → バッファ読み出し を繰り返す。
//! 内部状態は`&mut self`でのみ変更されるため、呼び出しは呼び出し側で直列化される。

use chrono::Utc;
use serde_json::{json, Value};

use super::actions::walk_actions;
use super::moderation::{parse_context_menu, ModerationAction};
use super::navigator::find_key;
use super::page::{extract_initial_data, send_params, WatchPage};
use super::types::{self as innertube_types, next_continuation};
use crate::config::{
    Locale, LiveChatOptions, CHANNEL_PAGE_URL, CONTEXT_MENU_API_URL, LIVE_CHAT_API_URL,
    LIVE_CHAT_PAGE_URL,
    LIVE_CHAT_REPLAY_API_URL, LIVE_CHAT_REPLAY_PAGE_URL, SEND_MESSAGE_API_URL, WATCH_PAGE_URL,
    YOUTUBE_ORIGIN,
};
use crate::util::mask_token;
use crate::youtube::auth::Credentials;
use crate::youtube::errors::{
    ConfigurationError, LiveChatError, ResolutionError, StateError, TransportError,
};
use crate::youtube::state::{SessionPhase, SessionState};
use crate::youtube::transport::{Headers, HttpTransport, Transport};
use crate::youtube::types::{ChatBatch, ChatItem, ChatItemDelete, LiveBroadcastDetails};

/// 接続時に渡すIDの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdType {
    /// 動画ID（`watch?v=`の値）
    Video,
    /// チャンネルID（現在配信中のライブに接続する）
    Channel,
}

impl IdType {
    fn as_str(&self) -> &'static str {
        match self {
            IdType::Video => "video",
            IdType::Channel => "channel",
        }
    }
}

/// ライブチャットセッション
pub struct LiveChat<T: Transport> {
    transport: T,
    options: LiveChatOptions,
    credentials: Option<Credentials>,
    state: SessionState,
    batch: ChatBatch,
}

impl LiveChat<HttpTransport> {
    /// reqwestトランスポートで接続（User-Agent・タイムアウトはオプションから）
    pub async fn connect_http(
        id: &str,
        id_type: IdType,
        options: LiveChatOptions,
    ) -> Result<Self, LiveChatError> {
        let transport = HttpTransport::with_config(&options.user_agent, options.timeout())?;
        Self::connect(transport, id, id_type, options).await
    }
}

impl<T: Transport> LiveChat<T> {
    /// セッションを作成して初期化する
    ///
    /// # Errors
    /// - IDが不正、配信が見つからない、continuationが取得できない場合は`Resolution`
    /// - ロケールが不完全な場合は`Configuration`
    /// - 通信失敗は`Transport`
    pub async fn connect(
        transport: T,
        id: &str,
        id_type: IdType,
        options: LiveChatOptions,
    ) -> Result<Self, LiveChatError> {
        validate_id(id)?;
        validate_locale(&options.locale)?;

        let mut chat = Self {
            transport,
            options,
            credentials: None,
            state: SessionState::new(),
            batch: ChatBatch::default(),
        };
        chat.bootstrap(id, id_type).await?;
        Ok(chat)
    }

    /// ページから初期データを取得してセッションを組み立てる
    async fn bootstrap(&mut self, id: &str, id_type: IdType) -> Result<(), LiveChatError> {
        self.state.reset_for_bootstrap();
        self.state.bootstrapped = true;
        self.batch = ChatBatch::default();

        let headers = self.auth_headers();
        let page = match id_type {
            IdType::Video => {
                let url = format!("{}{}", WATCH_PAGE_URL, id);
                log::info!("Fetching watch page for video {}", id);
                let html = self.transport.fetch_text(&url, &headers).await?;
                let page = WatchPage::parse(&html, self.options.top_chat_only);
                self.state.video_id = Some(id.to_string());
                self.state.channel_id = page.channel_id.clone();
                page
            }
            IdType::Channel => {
                let url = format!("{}{}/live", CHANNEL_PAGE_URL, id);
                log::info!("Fetching live page for channel {}", id);
                let html = self.transport.fetch_text(&url, &headers).await?;
                let page = WatchPage::parse(&html, self.options.top_chat_only);
                let video_id = page
                    .video_id
                    .clone()
                    .ok_or_else(|| ResolutionError::ChannelNotLive(id.to_string()))?;
                self.state.video_id = Some(video_id);
                self.state.channel_id = Some(id.to_string());
                page
            }
        };

        self.state.is_replay = page.is_replay;
        self.state.datasync_id = page.datasync_id;
        let continuation = page
            .continuation
            .ok_or_else(|| ResolutionError::ContinuationNotFound {
                kind: id_type.as_str(),
                id: id.to_string(),
            })?;
        let api_key = page.api_key.ok_or(ResolutionError::ApiKeyNotFound)?;
        log::debug!(
            "Resolved continuation {} and API key {}",
            mask_token(&continuation),
            mask_token(&api_key)
        );
        self.state.api_key = Some(api_key);

        // チャット埋め込みページから初期アクションと次のcontinuationを取得
        let (chat_page_url, chat_page_headers) = if self.state.is_replay {
            (LIVE_CHAT_REPLAY_PAGE_URL, Headers::new())
        } else {
            (LIVE_CHAT_PAGE_URL, headers)
        };
        let html = self
            .transport
            .fetch_text(&format!("{}{}", chat_page_url, continuation), &chat_page_headers)
            .await?;
        self.state.continuation = Some(continuation);

        match extract_initial_data(&html) {
            Some(initial_data) => {
                if !self.state.is_replay {
                    self.state.send_params = send_params(&initial_data).map(str::to_string);
                }
                if let Some(actions) = innertube_types::actions(&initial_data) {
                    walk_actions(actions, &mut self.batch);
                }
                self.state
                    .apply_continuation(next_continuation(&initial_data, self.state.is_replay));
                self.state.init_data_pending = true;
            }
            None => {
                log::warn!("ytInitialData not found in chat page, first poll will fetch");
                self.state.init_data_pending = false;
            }
        }

        log::info!(
            "Live chat session initialized (video: {:?}, replay: {}, initial items: {})",
            self.state.video_id,
            self.state.is_replay,
            self.batch.chat_items.len()
        );
        Ok(())
    }

    /// チャットを取得してバッファを更新する
    ///
    /// バッファは呼び出しのたびに上書きされるため、次の呼び出し前に読み出すこと。
    /// `offset_ms`はリプレイ時の再生位置（負の値は0として扱う）。
    /// 初期化直後の最初の呼び出しは、初期化時に取得済みのデータを残したまま何もしない。
    pub async fn poll(&mut self, offset_ms: i64) -> Result<(), LiveChatError> {
        if self.state.init_data_pending {
            self.state.init_data_pending = false;
            return Ok(());
        }

        self.batch = ChatBatch::default();

        let continuation = self
            .state
            .continuation
            .clone()
            .ok_or(StateError::ContinuationMissing)?;
        let api_key = self.api_key()?;

        let endpoint = if self.state.is_replay {
            LIVE_CHAT_REPLAY_API_URL
        } else {
            LIVE_CHAT_API_URL
        };
        let url = format!("{}?key={}", endpoint, api_key);
        let offset = self.state.is_replay.then_some(offset_ms);
        let payload = self.build_poll_payload(&continuation, offset);

        let response = self
            .transport
            .fetch_json(&url, &self.auth_headers(), &payload)
            .await?;

        if self.state.visitor_data.as_deref().map_or(true, str::is_empty) {
            self.state.visitor_data = innertube_types::visitor_data(&response).map(str::to_string);
        }
        if let Some(version) = innertube_types::client_version(&response) {
            self.state.client_version = Some(version.to_string());
        }

        if let Some(actions) = innertube_types::actions(&response) {
            walk_actions(actions, &mut self.batch);
        }
        self.state
            .apply_continuation(next_continuation(&response, self.state.is_replay));
        self.state.poll_count += 1;

        log::debug!(
            "Poll #{}: {} items, {} tickers, {} deletions",
            self.state.poll_count,
            self.batch.chat_items.len(),
            self.batch.ticker_paid_messages.len(),
            self.batch.deletions.len()
        );
        Ok(())
    }

    /// チャットにメッセージを送信する（ライブのみ）
    ///
    /// continuationやバッファは変更しない。
    pub async fn send_message(&mut self, text: &str) -> Result<(), LiveChatError> {
        let datasync_id = self.require_authenticated()?;
        let params = self
            .state
            .send_params
            .clone()
            .ok_or(StateError::SendParamsMissing)?;
        let api_key = self.api_key()?;

        let client_message_id = self.state.next_client_message_id();
        let payload = json!({
            "clientMessageId": client_message_id,
            "context": {
                "client": {
                    "clientName": "WEB",
                    "clientVersion": self.state.client_version_or_fallback(),
                },
                "user": {
                    "onBehalfOfUser": datasync_id,
                },
            },
            "params": params,
            "richMessage": {
                "textSegments": {
                    "text": text,
                },
            },
        });

        let url = format!("{}?key={}", SEND_MESSAGE_API_URL, api_key);
        let sent = self
            .transport
            .post_json(&url, &self.auth_headers(), &payload)
            .await?;
        if !sent {
            return Err(TransportError::Rejected("send_message was not accepted".to_string()).into());
        }

        log::info!("Sent chat message (clientMessageId: {})", client_message_id);
        Ok(())
    }

    /// 認証情報を設定して再初期化する
    ///
    /// 送信に必要な値はCookie付きで取得したページにしか含まれないため。
    pub async fn set_credentials(&mut self, credentials: Credentials) -> Result<(), LiveChatError> {
        if !credentials.is_complete() {
            return Err(ConfigurationError::CredentialsMissing.into());
        }
        self.credentials = Some(credentials);
        self.reset().await
    }

    /// 認証情報を破棄して再初期化する
    pub async fn clear_credentials(&mut self) -> Result<(), LiveChatError> {
        self.credentials = None;
        self.reset().await
    }

    /// 取得時の国・言語コードを設定
    pub fn set_locale(
        &mut self,
        country: impl Into<String>,
        language: impl Into<String>,
    ) -> Result<(), ConfigurationError> {
        let locale = Locale::new(country, language);
        validate_locale(&locale)?;
        self.options.locale = locale;
        Ok(())
    }

    /// バッファ・カウンターを破棄し、同じ動画で初期化し直す
    ///
    /// ポーリング中の予期しないエラーからの復旧に使う。失敗した場合、
    /// セッションは`SessionPhase::Invalid`のまま残る。
    pub async fn reset(&mut self) -> Result<(), LiveChatError> {
        let video_id = self
            .state
            .video_id
            .clone()
            .ok_or(StateError::VideoIdMissing)?;
        log::info!("Resetting live chat session for video {}", video_id);
        self.bootstrap(&video_id, IdType::Video).await
    }

    // ========================================
    // モデレーション
    // ========================================

    /// チャットを削除する
    ///
    /// モデレーション系の操作はいずれもライブのみで、認証情報とdatasyncIdが必要。
    /// パラメータが未取得ならコンテキストメニューを取得して`item`に保持する。
    pub async fn delete_message(&mut self, item: &mut ChatItem) -> Result<(), LiveChatError> {
        self.moderate(item, ModerationAction::Delete).await
    }

    /// 投稿者を一時的にタイムアウトする
    pub async fn ban_author_temporarily(
        &mut self,
        item: &mut ChatItem,
    ) -> Result<(), LiveChatError> {
        self.moderate(item, ModerationAction::TimeBan).await
    }

    /// 投稿者を永久にBANする
    pub async fn ban_user_permanently(&mut self, item: &mut ChatItem) -> Result<(), LiveChatError> {
        self.moderate(item, ModerationAction::Ban).await
    }

    /// 投稿者のBANを解除する
    pub async fn unban_user(&mut self, item: &mut ChatItem) -> Result<(), LiveChatError> {
        self.moderate(item, ModerationAction::Unban).await
    }

    /// チャットを上部に固定する
    pub async fn pin_message(&mut self, item: &mut ChatItem) -> Result<(), LiveChatError> {
        self.moderate(item, ModerationAction::Pin).await
    }

    /// コンテキストメニューを取得し、`item.moderation_params`を更新する
    pub async fn fetch_context_menu(&mut self, item: &mut ChatItem) -> Result<(), LiveChatError> {
        let datasync_id = self.require_authenticated()?;
        let menu_params = item
            .context_menu_params
            .clone()
            .ok_or(StateError::ContextMenuParamsMissing)?;
        let api_key = self.api_key()?;

        let url = format!(
            "{}?key={}&params={}",
            CONTEXT_MENU_API_URL, api_key, menu_params
        );
        let payload = self.build_client_payload(&datasync_id, None);
        let response = self
            .transport
            .fetch_json(&url, &self.auth_headers(), &payload)
            .await?;

        item.moderation_params = parse_context_menu(&response);
        log::debug!("Fetched context menu for item {:?}", item.id);
        Ok(())
    }

    async fn moderate(
        &mut self,
        item: &mut ChatItem,
        action: ModerationAction,
    ) -> Result<(), LiveChatError> {
        let datasync_id = self.require_authenticated()?;
        if action.params(&item.moderation_params).is_none() {
            self.fetch_context_menu(item).await?;
        }
        let params = action
            .params(&item.moderation_params)
            .ok_or(StateError::ModerationParamsMissing(action.as_str()))?
            .to_string();
        let api_key = self.api_key()?;

        let url = format!("{}?key={}", action.endpoint(), api_key);
        let payload = self.build_client_payload(&datasync_id, Some(&params));
        let accepted = self
            .transport
            .post_json(&url, &self.auth_headers(), &payload)
            .await?;
        if !accepted {
            return Err(
                TransportError::Rejected(format!("{} was not accepted", action.as_str())).into(),
            );
        }

        log::info!("Moderation '{}' applied to item {:?}", action.as_str(), item.id);
        Ok(())
    }

    /// 配信の状態（配信中か・開始/終了時刻）を取得する
    ///
    /// リプレイでも使える。認証情報は使わない。
    pub async fn broadcast_info(&self) -> Result<LiveBroadcastDetails, LiveChatError> {
        let video_id = self
            .state
            .video_id
            .as_deref()
            .ok_or(StateError::VideoIdMissing)?;

        let url = format!("{}{}&hl=en&pbj=1", WATCH_PAGE_URL, video_id);
        let mut headers = Headers::new();
        headers.insert("x-youtube-client-name".to_string(), "1".to_string());
        headers.insert(
            "x-youtube-client-version".to_string(),
            self.state.client_version_or_fallback(),
        );

        let body = self.transport.fetch_text(&url, &headers).await?;
        let response: Value = serde_json::from_str(&body).map_err(TransportError::from)?;
        let details = find_key(&response, "liveBroadcastDetails")
            .ok_or_else(|| ResolutionError::BroadcastDetailsNotFound(video_id.to_string()))?;
        let details = serde_json::from_value(details.clone()).map_err(TransportError::from)?;
        Ok(details)
    }

    /// ライブ・認証済み・datasyncIdありを確認し、datasyncIdを返す
    fn require_authenticated(&self) -> Result<String, LiveChatError> {
        if self.state.is_replay {
            return Err(StateError::ReplayMode.into());
        }
        if !self.credentials.as_ref().is_some_and(Credentials::is_complete) {
            return Err(ConfigurationError::CredentialsMissing.into());
        }
        let datasync_id = self
            .state
            .datasync_id
            .clone()
            .ok_or(StateError::SessionSyncIdMissing)?;
        Ok(datasync_id)
    }

    fn api_key(&self) -> Result<String, StateError> {
        self.state.api_key.clone().ok_or(StateError::ApiKeyMissing)
    }

    /// モデレーション・コンテキストメニュー用のリクエストボディ
    fn build_client_payload(&self, datasync_id: &str, params: Option<&str>) -> Value {
        let mut payload = json!({
            "context": {
                "client": {
                    "clientName": "WEB",
                    "clientVersion": self.state.client_version_or_fallback(),
                },
                "user": {
                    "onBehalfOfUser": datasync_id,
                },
            },
        });
        if let Some(params) = params {
            payload["params"] = json!(params);
        }
        payload
    }

    /// ポーリング用のリクエストボディを構築
    fn build_poll_payload(&self, continuation: &str, offset_ms: Option<i64>) -> Value {
        let mut client = serde_json::Map::new();
        if let Some(visitor_data) = self.state.visitor_data.as_deref().filter(|v| !v.is_empty()) {
            client.insert("visitorData".to_string(), json!(visitor_data));
        }
        client.insert("userAgent".to_string(), json!(self.options.user_agent));
        client.insert("clientName".to_string(), json!("WEB"));
        client.insert(
            "clientVersion".to_string(),
            json!(self.state.client_version_or_fallback()),
        );
        client.insert("gl".to_string(), json!(self.options.locale.country));
        client.insert("hl".to_string(), json!(self.options.locale.language));

        let mut payload = json!({
            "context": {"client": client},
            "continuation": continuation,
        });
        if let Some(offset) = offset_ms {
            payload["currentPlayerState"] = json!({
                "playerOffsetMs": offset.max(0).to_string(),
            });
        }
        payload
    }

    /// 認証ヘッダー（認証情報がない場合は空）
    fn auth_headers(&self) -> Headers {
        match &self.credentials {
            Some(credentials) if credentials.is_complete() => {
                credentials.auth_headers(YOUTUBE_ORIGIN, Utc::now().timestamp())
            }
            _ => Headers::new(),
        }
    }

    // ========================================
    // アクセサ
    // ========================================

    pub fn chat_items(&self) -> &[ChatItem] {
        &self.batch.chat_items
    }

    pub fn ticker_paid_messages(&self) -> &[ChatItem] {
        &self.batch.ticker_paid_messages
    }

    pub fn deletions(&self) -> &[ChatItemDelete] {
        &self.batch.deletions
    }

    pub fn banner_item(&self) -> Option<&ChatItem> {
        self.batch.banner_item.as_ref()
    }

    /// 4つのバッファをまとめて取り出す（取り出した後のバッファは空）
    pub fn take_batch(&mut self) -> ChatBatch {
        std::mem::take(&mut self.batch)
    }

    pub fn video_id(&self) -> Option<&str> {
        self.state.video_id.as_deref()
    }

    pub fn channel_id(&self) -> Option<&str> {
        self.state.channel_id.as_deref()
    }

    pub fn is_replay(&self) -> bool {
        self.state.is_replay
    }

    pub fn locale(&self) -> &Locale {
        &self.options.locale
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// 次回ポーリングまでの推奨待機時間
    pub fn poll_interval(&self) -> std::time::Duration {
        self.state.poll_interval()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> std::fmt::Debug for LiveChat<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveChat")
            .field("video_id", &self.state.video_id)
            .field("channel_id", &self.state.channel_id)
            .field("is_replay", &self.state.is_replay)
            .field("phase", &self.state.phase())
            .field("has_credentials", &self.credentials.is_some())
            .finish()
    }
}

/// 動画ID・チャンネルIDとして使える文字か検証
fn validate_id(id: &str) -> Result<(), ResolutionError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ResolutionError::MalformedId(id.to_string()))
    }
}

fn validate_locale(locale: &Locale) -> Result<(), ConfigurationError> {
    if locale.country.trim().is_empty() {
        return Err(ConfigurationError::MissingCountry);
    }
    if locale.language.trim().is_empty() {
        return Err(ConfigurationError::MissingLanguage);
    }
    Ok(())
}
