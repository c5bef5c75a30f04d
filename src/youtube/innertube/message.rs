//! メッセージ（runs配列）のデコード

use serde_json::Value;

use super::navigator::{get_array, get_bool, get_str, get_string_list, get_u32};
use crate::youtube::types::{Emoji, MessageRun};

/// サムネイル配列から最大幅のURLを選ぶ
///
/// 同じ幅が複数ある場合は後勝ち。幅が欠けている要素は0扱い。
pub fn largest_thumbnail_url(thumbnails: &[Value]) -> Option<String> {
    let mut best: Option<(u32, &str)> = None;
    for thumbnail in thumbnails {
        let Some(url) = get_str(thumbnail, "/url") else {
            continue;
        };
        let width = get_u32(thumbnail, "/width").unwrap_or(0);
        match best {
            Some((max, _)) if width < max => {}
            _ => best = Some((width, url)),
        }
    }
    best.map(|(_, url)| url.to_string())
}

/// `{thumbnails: [...]}`形式のノードから最大幅のURLを取得
pub fn largest_thumbnail_at(node: &Value, path: &str) -> Option<String> {
    get_array(node, path).and_then(|thumbnails| largest_thumbnail_url(thumbnails))
}

/// `{runs: [...]}`形式のメッセージをデコード
///
/// 戻り値は（表示用テキスト, リッチコンテンツ）。テキストを生成したrunが
/// 1つもなければ表示用テキストはNone。
pub fn decode_message(message: &Value) -> (Option<String>, Vec<MessageRun>) {
    let mut text: Option<String> = None;
    let mut rich_content = Vec::new();

    let Some(runs) = get_array(message, "/runs") else {
        return (text, rich_content);
    };

    for run in runs {
        if let Some(s) = get_str(run, "/text") {
            text.get_or_insert_with(String::new).push_str(s);
            rich_content.push(MessageRun::Text {
                text: s.to_string(),
            });
        }
        // 1つのrunにtextとemojiが両方ある場合はどちらも出力する
        if let Some(emoji_node) = run.get("emoji") {
            let emoji = decode_emoji(emoji_node);
            // ショートカットがない絵文字はテキストに何も挿入しない
            if let Some(shortcut) = emoji.shortcuts.first() {
                let buf = text.get_or_insert_with(String::new);
                buf.push(' ');
                buf.push_str(shortcut);
                buf.push(' ');
            }
            rich_content.push(MessageRun::Emoji { emoji });
        }
    }

    (text, rich_content)
}

fn decode_emoji(node: &Value) -> Emoji {
    Emoji {
        emoji_id: get_str(node, "/emojiId").map(str::to_string),
        shortcuts: get_string_list(node, "/shortcuts"),
        search_terms: get_string_list(node, "/searchTerms"),
        icon_url: largest_thumbnail_at(node, "/image/thumbnails"),
        is_custom_emoji: get_bool(node, "/isCustomEmoji").unwrap_or(false),
    }
}
