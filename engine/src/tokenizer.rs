/// Split a line into whitespace-delimited words.
///
/// Words are case-sensitive and keep any punctuation attached to them; a
/// repeated word is yielded once per occurrence.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// True when the line carries no words at all.
pub fn is_blank(text: &str) -> bool {
    text.split_whitespace().next().is_none()
}
