/// Keeps at most `limit` characters (Unicode scalar values) from the start of `value`.
pub(crate) fn truncate_chars(value: &str, limit: usize) -> &str {
    match value.char_indices().nth(limit) {
        Some((end, _)) => &value[..end],
        None => value,
    }
}
