use thiserror::Error;

/// トランスポート層（HTTP）のエラー
///
/// 呼び出し側でリトライ可能。ポーリング中に発生した場合は`reset()`での復旧を推奨。
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Request rejected: {0}")]
    Rejected(String),
}

/// 設定不備（呼び出し側で修正可能）
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Locale must have a country code")]
    MissingCountry,

    #[error("Locale must have a language code")]
    MissingLanguage,

    #[error("Credentials are not set - call set_credentials() first")]
    CredentialsMissing,
}

/// 初期化時の解決エラー（致命的）
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("No continuation token found for {kind} id: {id}")]
    ContinuationNotFound { kind: &'static str, id: String },

    #[error("The channel (ID:{0}) has not started live streaming")]
    ChannelNotLive(String),

    #[error("Malformed id: {0:?}")]
    MalformedId(String),

    #[error("InnerTube API key not found in page")]
    ApiKeyNotFound,

    #[error("liveBroadcastDetails not found for video: {0}")]
    BroadcastDetailsNotFound(String),
}

/// 状態遷移の誤用（プログラムエラー）
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StateError {
    #[error("continuation is missing - call reset()")]
    ContinuationMissing,

    #[error("This operation is not available on a replay")]
    ReplayMode,

    #[error("datasyncId is missing - call reset() or set credentials")]
    SessionSyncIdMissing,

    #[error("Send params are missing - the page was fetched without valid cookies")]
    SendParamsMissing,

    #[error("InnerTube API key is missing - call reset()")]
    ApiKeyMissing,

    #[error("video id is missing - the session was never bootstrapped")]
    VideoIdMissing,

    #[error("Chat item has no context menu params")]
    ContextMenuParamsMissing,

    #[error("{0} params not found in context menu - check your permission on this chat")]
    ModerationParamsMissing(&'static str),
}

#[derive(Error, Debug)]
pub enum LiveChatError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("State error: {0}")]
    State(#[from] StateError),
}

impl LiveChatError {
    /// 呼び出し側で`reset()`後にリトライ可能かどうか
    pub fn is_retryable(&self) -> bool {
        matches!(self, LiveChatError::Transport(_))
    }
}
