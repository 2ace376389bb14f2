//! Channel length normalization.
//!
//! Lengths are counted in Unicode scalar values (`char`s), which is how the
//! chat platform counts message length.

/// Hard message-length ceiling of the chat channel.
pub const CHANNEL_LIMIT: usize = 2000;

/// Appended to text that had to be cut.  Ten characters long.
pub const TRUNCATION_MARKER: &str = "\n[trimmed]";

/// Bound `text` to [`CHANNEL_LIMIT`].
pub fn format_for_channel(text: &str) -> String {
    format_with_limit(text, CHANNEL_LIMIT)
}

/// Bound `text` to `limit` characters.
///
/// Text that fits is returned unchanged.  Otherwise the result is the first
/// `limit - 10` characters followed by [`TRUNCATION_MARKER`], exactly `limit`
/// characters in total, so applying this twice changes nothing.  The cut
/// does not try to close open code fences.
pub fn format_with_limit(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_owned();
    }

    let marker_len = TRUNCATION_MARKER.chars().count();
    let keep = limit.saturating_sub(marker_len);
    let cut = text
        .char_indices()
        .nth(keep)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());

    let mut out = String::with_capacity(cut + TRUNCATION_MARKER.len());
    out.push_str(&text[..cut]);
    out.push_str(TRUNCATION_MARKER);
    tracing::debug!(
        original_chars = text.chars().count(),
        limit,
        "answer truncated for channel"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_is_ten_chars() {
        assert_eq!(TRUNCATION_MARKER.chars().count(), 10);
    }

    #[test]
    fn short_text_is_unchanged() {
        assert_eq!(format_for_channel(""), "");
        assert_eq!(format_for_channel("hello"), "hello");
        let exact = "x".repeat(CHANNEL_LIMIT);
        assert_eq!(format_for_channel(&exact), exact);
    }

    #[test]
    fn long_text_is_cut_to_exactly_the_limit() {
        let text = "y".repeat(CHANNEL_LIMIT + 1);
        let out = format_for_channel(&text);
        assert_eq!(out.chars().count(), CHANNEL_LIMIT);
        assert!(out.ends_with(TRUNCATION_MARKER));
        assert_eq!(&out[..1990], &"y".repeat(1990));
    }

    #[test]
    fn multibyte_text_is_counted_by_chars() {
        // 1500 two-char units: 3000 chars, far more bytes.
        let text = "答🙂".repeat(1500);
        let out = format_for_channel(&text);
        assert_eq!(out.chars().count(), CHANNEL_LIMIT);
        assert!(out.starts_with("答🙂答🙂"));
        assert!(out.ends_with(TRUNCATION_MARKER));

        // 2000 multibyte chars fit even though they exceed 2000 bytes.
        let fits = "é".repeat(CHANNEL_LIMIT);
        assert_eq!(format_for_channel(&fits), fits);
    }

    #[test]
    fn formatting_is_idempotent() {
        for len in [0, 1, 1999, 2000, 2001, 2010, 5000] {
            let text: String = "abc🙂".chars().cycle().take(len).collect();
            let once = format_for_channel(&text);
            assert_eq!(format_for_channel(&once), once, "len {len}");
        }
    }

    #[test]
    fn open_code_fence_is_not_repaired() {
        let text = format!("```rust\n{}", "a".repeat(3000));
        let out = format_for_channel(&text);
        assert!(out.starts_with("```rust\n"));
        assert_eq!(out.matches("```").count(), 1);
    }

    #[test]
    fn custom_limit() {
        let out = format_with_limit(&"z".repeat(500), 100);
        assert_eq!(out.chars().count(), 100);
        assert!(out.ends_with(TRUNCATION_MARKER));
    }
}
