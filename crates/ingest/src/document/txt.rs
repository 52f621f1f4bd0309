/// Decode text bytes as UTF-8. Invalid sequences are replaced rather than
/// rejected; the text is otherwise kept exactly as uploaded.
pub fn extract_txt(bytes: &[u8]) -> String {
    String::from_utf8(bytes.to_vec()).unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_simple_text() {
        let text = extract_txt(b"Hello, world!\nThis is a test file.");
        assert_eq!(text, "Hello, world!\nThis is a test file.");
    }

    #[test]
    fn extract_utf8_text() {
        let content = "Ünïcödé text with émojis 🎉".as_bytes();
        assert_eq!(extract_txt(content), "Ünïcödé text with émojis 🎉");
    }

    #[test]
    fn keeps_surrounding_whitespace() {
        assert_eq!(extract_txt(b"  \n  Hello  \n  "), "  \n  Hello  \n  ");
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let text = extract_txt(&[b'o', b'k', 0xff, b'!']);
        assert_eq!(text, "ok\u{FFFD}!");
    }

    #[test]
    fn empty_input() {
        assert_eq!(extract_txt(b""), "");
    }
}
