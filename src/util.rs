use rand::Rng;

/// clientMessageIdのプレフィックスに使う文字
const CLIENT_MESSAGE_ID_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ-";

/// clientMessageIdプレフィックスの長さ
const CLIENT_MESSAGE_ID_LEN: usize = 26;

/// APIキーやcontinuationトークンをマスキングしてログ出力用の文字列を生成
///
/// 最初の4文字と最後の4文字のみを表示し、中間を***でマスキング
///
/// # Examples
/// ```
/// use youtube_live_chat::util::mask_token;
///
/// let masked = mask_token("AIzaSyABC123def456GHI789");
/// assert_eq!(masked, "AIza***I789");
/// ```
pub fn mask_token(token: &str) -> String {
    let len = token.chars().count();
    if len <= 8 {
        // 短いトークンは全体をマスク
        return "***".to_string();
    }

    let prefix: String = token.chars().take(4).collect();
    let suffix: String = token.chars().skip(len - 4).collect();
    format!("{}***{}", prefix, suffix)
}

/// 送信メッセージ用のclientMessageIdプレフィックスを生成
///
/// セッションごとに固定し、末尾に送信カウンターを連結して使う。
pub fn generate_client_message_id() -> String {
    let mut rng = rand::thread_rng();
    (0..CLIENT_MESSAGE_ID_LEN)
        .map(|_| CLIENT_MESSAGE_ID_CHARS[rng.gen_range(0..CLIENT_MESSAGE_ID_CHARS.len())] as char)
        .collect()
}
