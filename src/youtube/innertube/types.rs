//! InnerTube API 固有の型定義とレスポンスのメタデータ抽出

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::navigator::{get_array, get_str, get_u32};

/// Continuation種別（ポーリング間隔の制御に使用）
///
/// InnerTube APIは複数種類のContinuationデータを返す:
/// - `invalidationContinuationData`: timeout_msはOptional、推奨間隔（短縮可能）
/// - `timedContinuationData`: timeout_msは必須、明示的な待機時間（厳守）
/// - `reloadContinuationData`: 初期化用（ページに埋め込まれている）
/// - `liveChatReplayContinuationData`: リプレイ用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContinuationType {
    /// invalidationContinuationData - 推奨間隔（短縮可能）
    Invalidation,
    /// timedContinuationData - 明示的な待機時間（厳守）
    Timed,
    /// reloadContinuationData - 初期化用
    Reload,
    /// liveChatReplayContinuationData - リプレイ用
    Replay,
}

/// ポーリング間隔の最大値（30秒）
/// 極端に大きな値が返された場合のガード
const MAX_POLLING_INTERVAL_MS: u64 = 30000;

/// ポーリング間隔の最小値（500ms）
/// 極端に短い値によるサーバー過負荷を防止
const MIN_POLLING_INTERVAL_MS: u64 = 500;

/// timeoutMsが返されなかった場合の値
pub(crate) const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// ライブ時のcontinuation優先順位
const LIVE_CONTINUATION_KEYS: [(&str, ContinuationType); 3] = [
    ("invalidationContinuationData", ContinuationType::Invalidation),
    ("timedContinuationData", ContinuationType::Timed),
    ("reloadContinuationData", ContinuationType::Reload),
];

const REPLAY_CONTINUATION_KEY: &str = "liveChatReplayContinuationData";

impl ContinuationType {
    /// 実効的なポーリング間隔を計算
    ///
    /// Continuation種別に応じて適切なポーリング間隔を返す:
    /// - `Invalidation`: 1秒固定（リアルタイム表示のため高頻度ポーリング）
    /// - `Timed`: APIの値を使用（500ms〜30秒でガード）
    /// - `Reload` / `Replay`: 1秒固定
    pub fn effective_timeout_ms(&self, api_timeout: u64) -> u64 {
        match self {
            ContinuationType::Invalidation => 1000, // 1秒固定
            ContinuationType::Timed => {
                api_timeout.clamp(MIN_POLLING_INTERVAL_MS, MAX_POLLING_INTERVAL_MS)
            }
            ContinuationType::Reload | ContinuationType::Replay => 1000,
        }
    }
}

/// 次回取得用のcontinuation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextContinuation {
    pub token: String,
    pub timeout_ms: u64,
    pub continuation_type: ContinuationType,
}

/// `liveChatContinuation`ノード（レスポンス・ページ共通）を取得
pub fn live_chat_continuation(response: &Value) -> Option<&Value> {
    response.pointer("/continuationContents/liveChatContinuation")
}

/// 次回取得用のcontinuationトークンを抽出
///
/// - リプレイ: `liveChatReplayContinuationData`のみを見る（最後に見つかったもの）
/// - ライブ: invalidation > timed > reload の優先順位で、リスト全体から
///   最初に見つかったものを採用
///
/// リプレイ用とライブ用のフィールドを混同して読むことはない。
pub fn next_continuation(response: &Value, is_replay: bool) -> Option<NextContinuation> {
    let entries = live_chat_continuation(response)
        .and_then(|c| get_array(c, "/continuations"))?;

    if is_replay {
        return entries
            .iter()
            .filter_map(|entry| entry.get(REPLAY_CONTINUATION_KEY))
            .filter_map(|data| {
                let token = get_str(data, "/continuation")?;
                Some(NextContinuation {
                    token: token.to_string(),
                    timeout_ms: get_u32(data, "/timeUntilLastMessageMsec")
                        .map(u64::from)
                        .unwrap_or(DEFAULT_TIMEOUT_MS),
                    continuation_type: ContinuationType::Replay,
                })
            })
            .last();
    }

    LIVE_CONTINUATION_KEYS.iter().find_map(|(key, continuation_type)| {
        entries.iter().find_map(|entry| {
            let data = entry.get(*key)?;
            let token = get_str(data, "/continuation")?;
            Some(NextContinuation {
                token: token.to_string(),
                timeout_ms: get_u32(data, "/timeoutMs")
                    .map(u64::from)
                    .unwrap_or(DEFAULT_TIMEOUT_MS),
                continuation_type: *continuation_type,
            })
        })
    })
}

/// アクション列を取得
pub fn actions(response: &Value) -> Option<&Vec<Value>> {
    live_chat_continuation(response).and_then(|c| get_array(c, "/actions"))
}

/// `responseContext.visitorData`を取得
pub fn visitor_data(response: &Value) -> Option<&str> {
    get_str(response, "/responseContext/visitorData")
}

/// トラッキングパラメータ（CSIサービスの`cver`）からクライアントバージョンを取得
pub fn client_version(response: &Value) -> Option<&str> {
    get_array(response, "/responseContext/serviceTrackingParams")?
        .iter()
        .filter(|service| get_str(service, "/service") == Some("CSI"))
        .filter_map(|service| get_array(service, "/params"))
        .flatten()
        .find(|param| get_str(param, "/key") == Some("cver"))
        .and_then(|param| get_str(param, "/value"))
}

/// クライアントバージョンが未取得の場合のフォールバック
///
/// 前日（UTC）の日付を使った`2.yyyyMMdd.06.00`形式。
pub fn fallback_client_version(now: DateTime<Utc>) -> String {
    let yesterday = now - Duration::days(1);
    format!("2.{}.06.00", yesterday.format("%Y%m%d"))
}
