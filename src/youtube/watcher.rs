//! ポーリングループ
//!
//! 「ポーリング → バッファ読み出し → 待機」を繰り返し、新着分だけをコールバックに渡す。
//! 失敗時は指数バックオフで待機しつつ`reset()`で復旧を試みる。

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use super::backoff::ExponentialBackoff;
use super::errors::LiveChatError;
use super::innertube::LiveChat;
use super::transport::Transport;
use super::types::{ChatBatch, ChatItem};

/// 重複排除用に保持するIDの最大数
const MAX_SEEN_IDS: usize = 10000;

/// ポーリングループの設定
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// 重複排除用に記憶するIDの数
    pub max_seen_ids: usize,
    /// エラー時の待機
    pub backoff: ExponentialBackoff,
    /// リプレイ開始位置（ミリ秒）。経過時間を加えてポーリングする
    pub replay_start_offset_ms: i64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            max_seen_ids: MAX_SEEN_IDS,
            backoff: ExponentialBackoff::new().with_jitter(0.2),
            replay_start_offset_ms: 0,
        }
    }
}

/// ライブチャットの監視ループ
pub struct ChatWatcher {
    running: Arc<AtomicBool>,
    config: WatcherConfig,
}

impl ChatWatcher {
    pub fn new(config: WatcherConfig) -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            config,
        }
    }

    /// ループを外部から止めるためのフラグ
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// 次のポーリング前にループを終了させる
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// 停止されるまでポーリングを続ける
    ///
    /// 新着のチャット・ティッカー・削除通知・バナーがあればまとめて`on_batch`に渡す。
    /// バックオフの試行回数を使い切った場合は最後のエラーを返す。
    pub async fn run<T, F>(
        &mut self,
        chat: &mut LiveChat<T>,
        mut on_batch: F,
    ) -> Result<(), LiveChatError>
    where
        T: Transport,
        F: FnMut(ChatBatch),
    {
        let capacity = NonZeroUsize::new(self.config.max_seen_ids).unwrap_or(NonZeroUsize::MIN);
        let mut seen_ids = SeenIds::new(capacity);
        let started = Instant::now();

        self.running.store(true, Ordering::SeqCst);
        log::info!("Chat watcher started for video {:?}", chat.video_id());

        while self.running.load(Ordering::SeqCst) {
            let offset_ms = self.config.replay_start_offset_ms
                + i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);

            let polls_before = chat.state().poll_count;
            match chat.poll(offset_ms).await {
                Ok(()) => {
                    // 実際に取得できた場合のみバックオフをリセット（初期化直後の空振りは除く）
                    if chat.state().poll_count > polls_before {
                        self.config.backoff.reset();
                    }

                    let batch = dedup_batch(chat.take_batch(), &mut seen_ids);
                    if !batch.is_empty() {
                        log::debug!(
                            "Chat watcher: {} new items, {} tickers",
                            batch.chat_items.len(),
                            batch.ticker_paid_messages.len()
                        );
                        on_batch(batch);
                    }

                    // Continuation種別に応じてポーリング間隔を制御
                    let interval = chat.poll_interval();
                    log::trace!("Chat watcher: next poll in {:?}", interval);
                    tokio::time::sleep(interval).await;
                }
                Err(e) => {
                    log::error!("Chat watcher poll error: {}", e);

                    if !self.config.backoff.should_retry() {
                        log::error!(
                            "Chat watcher giving up after {} attempts",
                            self.config.backoff.attempt_count()
                        );
                        self.running.store(false, Ordering::SeqCst);
                        return Err(e);
                    }

                    // 指数バックオフで待機してから再初期化
                    let delay = self.config.backoff.next_delay();
                    log::info!("Chat watcher: retrying in {:?}", delay);
                    tokio::time::sleep(delay).await;

                    if let Err(reset_err) = chat.reset().await {
                        log::warn!("Chat watcher reset failed: {}", reset_err);
                    }
                }
            }
        }

        log::info!("Chat watcher stopped");
        Ok(())
    }
}

impl Default for ChatWatcher {
    fn default() -> Self {
        Self::new(WatcherConfig::default())
    }
}

/// 配信済みIDの記録
///
/// スーパーチャットは本体とティッカーが同じIDで届くので、別々に管理する。
struct SeenIds {
    chat_items: LruCache<String, ()>,
    tickers: LruCache<String, ()>,
}

impl SeenIds {
    fn new(capacity: NonZeroUsize) -> Self {
        Self {
            chat_items: LruCache::new(capacity),
            tickers: LruCache::new(capacity),
        }
    }
}

fn retain_new(items: Vec<ChatItem>, seen: &mut LruCache<String, ()>) -> Vec<ChatItem> {
    items
        .into_iter()
        .filter(|item| match &item.id {
            Some(id) => seen.put(id.clone(), ()).is_none(),
            None => false,
        })
        .collect()
}

/// 既に配信済みのIDを除外する
fn dedup_batch(batch: ChatBatch, seen: &mut SeenIds) -> ChatBatch {
    ChatBatch {
        chat_items: retain_new(batch.chat_items, &mut seen.chat_items),
        ticker_paid_messages: retain_new(batch.ticker_paid_messages, &mut seen.tickers),
        deletions: batch.deletions,
        banner_item: batch.banner_item,
    }
}
