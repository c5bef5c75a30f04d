use rand::Rng;
use std::time::Duration;

/// 指数バックオフの最大試行回数
/// これを超えるとリトライを停止する
const MAX_ATTEMPTS: u32 = 10;

/// 指数バックオフを管理する構造体
/// エラー時のリトライ間隔を指数的に増加させる（1s→2s→4s→8s→16s...）
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    base_delay: Duration,
    max_delay: Duration,
    max_attempts: u32,
    current_attempt: u32,
    /// 待機時間に加える揺らぎの割合（0.0〜1.0）
    jitter: f64,
}

impl ExponentialBackoff {
    /// 新しいExponentialBackoffインスタンスを作成
    ///
    /// デフォルト設定:
    /// - base_delay: 1秒
    /// - max_delay: 60秒
    /// - max_attempts: 10回
    /// - jitter: なし
    pub fn new() -> Self {
        Self::with_config(Duration::from_secs(1), Duration::from_secs(60), MAX_ATTEMPTS)
    }

    /// カスタム設定でExponentialBackoffインスタンスを作成
    pub fn with_config(base_delay: Duration, max_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            max_delay,
            max_attempts,
            current_attempt: 0,
            jitter: 0.0,
        }
    }

    /// 待機時間に最大`ratio`倍の揺らぎを加える
    ///
    /// 複数セッションが同時に再接続する場合のリクエスト集中を避ける。
    pub fn with_jitter(mut self, ratio: f64) -> Self {
        self.jitter = ratio.clamp(0.0, 1.0);
        self
    }

    /// 次のリトライまでの待機時間を計算して返す
    ///
    /// 計算式: base_delay * 2^current_attempt（+ jitter）
    /// max_delayを超える場合はmax_delayが返される
    pub fn next_delay(&mut self) -> Duration {
        let delay = 2u32
            .checked_pow(self.current_attempt)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .unwrap_or(self.max_delay)
            .min(self.max_delay);
        self.current_attempt = self.current_attempt.saturating_add(1);

        if self.jitter > 0.0 {
            let extra = rand::thread_rng().gen_range(0.0..=self.jitter);
            (delay + delay.mul_f64(extra)).min(self.max_delay)
        } else {
            delay
        }
    }

    /// バックオフカウンターをリセット（成功時に呼び出す）
    pub fn reset(&mut self) {
        self.current_attempt = 0;
    }

    /// 現在の試行回数を取得
    pub fn attempt_count(&self) -> u32 {
        self.current_attempt
    }

    /// 最大試行回数に達したかどうかを確認
    pub fn has_exceeded_max_attempts(&self) -> bool {
        self.current_attempt >= self.max_attempts
    }

    /// リトライを続行すべきかどうかを確認
    pub fn should_retry(&self) -> bool {
        !self.has_exceeded_max_attempts()
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_progression() {
        let mut backoff = ExponentialBackoff::new();

        assert_eq!(backoff.next_delay(), Duration::from_secs(1)); // 2^0 = 1
        assert_eq!(backoff.next_delay(), Duration::from_secs(2)); // 2^1 = 2
        assert_eq!(backoff.next_delay(), Duration::from_secs(4)); // 2^2 = 4
        assert_eq!(backoff.next_delay(), Duration::from_secs(8)); // 2^3 = 8
        assert_eq!(backoff.next_delay(), Duration::from_secs(16)); // 2^4 = 16
        assert_eq!(backoff.next_delay(), Duration::from_secs(32)); // 2^5 = 32
        assert_eq!(backoff.next_delay(), Duration::from_secs(60)); // 2^6 = 64 -> max 60
    }

    #[test]
    fn test_backoff_reset() {
        let mut backoff = ExponentialBackoff::new();

        assert_eq!(backoff.next_delay(), Duration::from_secs(1));
        assert_eq!(backoff.next_delay(), Duration::from_secs(2));

        backoff.reset();

        assert_eq!(backoff.next_delay(), Duration::from_secs(1));
        assert_eq!(backoff.attempt_count(), 1);
    }

    #[test]
    fn test_max_attempts() {
        let mut backoff = ExponentialBackoff::with_config(
            Duration::from_secs(1),
            Duration::from_secs(60),
            3,
        );

        assert!(backoff.should_retry());
        backoff.next_delay();
        backoff.next_delay();
        assert!(backoff.should_retry());
        backoff.next_delay();
        assert!(!backoff.should_retry());
        assert!(backoff.has_exceeded_max_attempts());
    }

    #[test]
    fn test_no_overflow_on_many_attempts() {
        // 2^32を超えてもパニックせず上限値になる
        let mut backoff = ExponentialBackoff::with_config(
            Duration::from_millis(500),
            Duration::from_secs(30),
            u32::MAX,
        );
        for _ in 0..40 {
            assert!(backoff.next_delay() <= Duration::from_secs(30));
        }
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let mut backoff = ExponentialBackoff::with_config(
            Duration::from_secs(1),
            Duration::from_secs(60),
            10,
        )
        .with_jitter(0.5);

        let first = backoff.next_delay();
        assert!(first >= Duration::from_secs(1));
        assert!(first <= Duration::from_millis(1500));

        // 上限は揺らぎを加えても超えない
        for _ in 0..10 {
            assert!(backoff.next_delay() <= Duration::from_secs(60));
        }
    }
}
