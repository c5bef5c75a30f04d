use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::innertube::types::{
    fallback_client_version, ContinuationType, NextContinuation, DEFAULT_TIMEOUT_MS,
};
use crate::util::{generate_client_message_id, mask_token};

/// セッションの状態
///
/// 初期化中（Bootstrapping）とポーリング中（Polling）は`&mut self`の呼び出し中にのみ
/// 存在するため、外から観測できるのは以下の3つ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    Uninitialized,
    Ready,
    /// continuationを失った状態（`reset()`で復旧する）
    Invalid,
}

/// ライブチャットセッションの状態を管理する構造体
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub video_id: Option<String>,
    pub channel_id: Option<String>,
    /// 初期化後は固定
    pub is_replay: bool,
    /// 次回リクエスト用のcontinuationトークン（ポーリングに必須）
    pub continuation: Option<String>,
    pub continuation_type: ContinuationType,
    /// APIから返された待機時間（ミリ秒）
    pub timeout_ms: u64,
    pub api_key: Option<String>,
    pub visitor_data: Option<String>,
    pub client_version: Option<String>,
    /// チャット送信用パラメータ
    pub send_params: Option<String>,
    /// 送信者を示すID（Cookie付きで取得したページにのみ含まれる）
    pub datasync_id: Option<String>,
    /// clientMessageIdのプレフィックス（リセットまで固定）
    pub client_message_prefix: String,
    /// 送信カウンター（リセットまで単調増加）
    pub message_counter: u64,
    /// 初期化時に取得したデータが未取得扱いで残っているか
    pub init_data_pending: bool,
    pub bootstrapped: bool,
    /// ポーリング実施回数
    pub poll_count: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            video_id: None,
            channel_id: None,
            is_replay: false,
            continuation: None,
            continuation_type: ContinuationType::Reload,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            api_key: None,
            visitor_data: None,
            client_version: None,
            send_params: None,
            datasync_id: None,
            client_message_prefix: generate_client_message_id(),
            message_counter: 0,
            init_data_pending: false,
            bootstrapped: false,
            poll_count: 0,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if !self.bootstrapped {
            SessionPhase::Uninitialized
        } else if self.continuation.is_none() {
            SessionPhase::Invalid
        } else {
            SessionPhase::Ready
        }
    }

    /// 再初期化の前に呼ぶ
    ///
    /// 動画IDは保持し、それ以外のセッション固有の値・カウンターを破棄する。
    pub fn reset_for_bootstrap(&mut self) {
        let video_id = self.video_id.take();
        *self = Self::new();
        self.video_id = video_id;
    }

    /// 次回用continuationを反映
    ///
    /// 新しいトークンが見つからなかった場合は現在のものを維持する。
    pub fn apply_continuation(&mut self, next: Option<NextContinuation>) {
        match next {
            Some(next) => {
                log::debug!(
                    "Updated continuation: {} ({:?}, timeout {}ms)",
                    mask_token(&next.token),
                    next.continuation_type,
                    next.timeout_ms
                );
                self.continuation = Some(next.token);
                self.continuation_type = next.continuation_type;
                self.timeout_ms = next.timeout_ms;
            }
            None => log::warn!("No next continuation found in response, keeping current token"),
        }
    }

    /// 送信用のclientMessageIdを発行（カウンターを進める）
    pub fn next_client_message_id(&mut self) -> String {
        let id = format!("{}{}", self.client_message_prefix, self.message_counter);
        self.message_counter += 1;
        id
    }

    /// 観測済みのクライアントバージョン、なければ日付ベースのフォールバック
    pub fn client_version_or_fallback(&self) -> String {
        self.client_version
            .clone()
            .unwrap_or_else(|| fallback_client_version(chrono::Utc::now()))
    }

    /// 次回ポーリングまでの推奨待機時間
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.continuation_type.effective_timeout_ms(self.timeout_ms))
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
