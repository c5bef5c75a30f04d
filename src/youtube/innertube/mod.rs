//! InnerTube API クライアントモジュール
//!
//! YouTubeの内部APIを使用してライブチャットを取得・送信する。
//! 公式API Data v3と異なり、APIキーの発行不要でクォータ制限なし。
//! アーカイブ（リプレイ）のチャットも再生位置を指定して取得できる。
//!
//! ## 注意事項
//! - 非公式APIのため、仕様変更のリスクあり
//! - レスポンスの個々のノードが壊れていても、そのノードを読み飛ばして処理を続ける

pub mod actions;
pub mod client;
pub mod message;
pub mod moderation;
pub mod navigator;
pub mod page;
pub mod parser;
pub mod types;

pub use client::{IdType, LiveChat};
pub use moderation::ModerationAction;
pub use parser::parse_chat_item;
pub use types::{ContinuationType, NextContinuation};
