//! YouTube ライブチャット
//!
//! InnerTube（YouTube内部API）経由でチャットを取得・送信する。

pub mod auth;
pub mod backoff;
pub mod errors;
pub mod innertube;
pub mod state;
pub mod transport;
pub mod types;
pub mod watcher;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::Credentials;
pub use errors::{ConfigurationError, LiveChatError, ResolutionError, StateError, TransportError};
pub use innertube::{IdType, LiveChat, ModerationAction};
pub use state::SessionPhase;
pub use transport::{Headers, HttpTransport, Transport};
pub use types::*;
pub use watcher::{ChatWatcher, WatcherConfig};
