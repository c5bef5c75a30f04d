//! 型なしJSONツリーへの安全なアクセス
//!
//! InnerTubeのレスポンスはスキーマが保証されないため、すべての参照は
//! `Option`を返し、キー欠落・型不一致・範囲外のいずれでもパニックしない。
//! パスはJSON Pointer形式（`/a/0/b`）。

use serde_json::Value;

/// パスで指定したノードを取得
pub fn get<'a>(node: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(node);
    }
    node.pointer(path)
}

/// 文字列ノードを借用で取得
pub fn get_str<'a>(node: &'a Value, path: &str) -> Option<&'a str> {
    get(node, path)?.as_str()
}

/// 文字列として取得（数値は文字列化する）
pub fn get_string(node: &Value, path: &str) -> Option<String> {
    match get(node, path)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// 整数として取得（数値文字列も受け付ける）
///
/// `timestampUsec`などは文字列で届くため。
pub fn get_i64(node: &Value, path: &str) -> Option<i64> {
    match get(node, path)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// u32として取得（ARGBカラー・秒数用）
pub fn get_u32(node: &Value, path: &str) -> Option<u32> {
    match get(node, path)? {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

pub fn get_bool(node: &Value, path: &str) -> Option<bool> {
    get(node, path)?.as_bool()
}

pub fn get_array<'a>(node: &'a Value, path: &str) -> Option<&'a Vec<Value>> {
    get(node, path)?.as_array()
}

/// 文字列配列を取得（文字列以外の要素は読み飛ばす）
pub fn get_string_list(node: &Value, path: &str) -> Vec<String> {
    get_array(node, path)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// キー名でツリー全体を深さ優先で探索し、最初に見つかった値を返す
///
/// パスが固定されていないレスポンス（`pbj=1`の視聴ページなど）用。
pub fn find_key<'a>(node: &'a Value, key: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map
            .get(key)
            .or_else(|| map.values().find_map(|child| find_key(child, key))),
        Value::Array(items) => items.iter().find_map(|child| find_key(child, key)),
        _ => None,
    }
}
