/// Literal prefix a line must start with to be kept as a link.
pub const LINK_PREFIX: &str = "http";

/// True when `line` starts with [`LINK_PREFIX`]. No trimming, no URL parsing.
pub fn is_link_line(line: &str) -> bool {
    line.starts_with(LINK_PREFIX)
}

/// Line boundaries: `\n`, `\r`, `\r\n` and the Unicode separators
/// (VT, FF, FS, GS, RS, NEL, LS, PS).
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Split `text` on line breaks and keep, in order, the lines that are links.
pub fn filter_links(text: &str) -> Vec<String> {
    // A `\r\n` pair yields an extra empty piece, which is never a link.
    text.split(is_line_break)
        .filter(|line| is_link_line(line))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_link_lines_in_order() {
        let text = "check this out\nhttp://a.test/1\nhttp://b.test/2\nnope";
        assert_eq!(filter_links(text), vec!["http://a.test/1", "http://b.test/2"]);
    }

    #[test]
    fn empty_text_yields_no_links() {
        assert!(filter_links("").is_empty());
        assert!(filter_links("\n\n").is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let text = "1. Song\nhttps://www.youtube.com/watch?v=abc\r\n  http://indented.test\nhttpfoo\n";
        let once = filter_links(text);
        let twice = filter_links(&once.join("\n"));
        assert_eq!(once, twice);
        assert_eq!(once, vec!["https://www.youtube.com/watch?v=abc", "httpfoo"]);
    }

    #[test]
    fn lone_carriage_returns_and_unicode_separators_split_lines() {
        let text = "intro\rhttp://a.test/1\u{2028}http://b.test/2\x0cnope";
        assert_eq!(filter_links(text), vec!["http://a.test/1", "http://b.test/2"]);
    }

    #[test]
    fn prefix_match_is_case_sensitive() {
        assert!(is_link_line("https://x.test"));
        assert!(!is_link_line("HTTP://x.test"));
        assert!(!is_link_line(" http://x.test"));
    }
}
