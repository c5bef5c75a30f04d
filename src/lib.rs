//! YouTube ライブチャットクライアント
//!
//! continuationトークンを引き継ぎながらチャットをポーリングし、
//! アクション列を共通のチャットモデルにデコードする。
//! ログは`log`ファサードに出力するため、ロガーの初期化は利用側で行う。
//!
//! ```no_run
//! use youtube_live_chat::config::LiveChatOptions;
//! use youtube_live_chat::youtube::{IdType, LiveChat};
//!
//! # async fn example() -> Result<(), youtube_live_chat::youtube::LiveChatError> {
//! let mut chat = LiveChat::connect_http("dQw4w9WgXcQ", IdType::Video, LiveChatOptions::default()).await?;
//! loop {
//!     chat.poll(0).await?;
//!     for item in chat.chat_items() {
//!         println!("{:?}: {:?}", item.author_name, item.message);
//!     }
//!     tokio::time::sleep(chat.poll_interval()).await;
//! }
//! # }
//! ```

pub mod config;
pub mod util;
pub mod youtube;

pub use config::{LiveChatOptions, Locale};
pub use youtube::{
    ChatBatch, ChatItem, ChatItemDelete, ChatItemKind, ChatWatcher, Credentials, IdType,
    LiveBroadcastDetails, LiveChat, LiveChatError, ModerationAction,
};
