use crate::types::Dialect;

/// Default delimiters tried when sniffing a table.
pub const DEFAULT_DELIMITERS: &[u8] = b",\t";

/// Pick the delimiter that splits every complete line of `text` into the same
/// number (at least two) of fields.
///
/// When several candidates are consistent the one producing the most fields
/// wins, ties going to the earlier candidate. The last line is ignored if the
/// text does not end with a newline and more than one line is present, since
/// it may have been cut off by a hint.
pub fn sniff_delimiter(text: &str, candidates: &[u8]) -> Option<u8> {
    let mut lines: Vec<&str> = text.lines().collect();
    if lines.len() > 1 && !text.ends_with('\n') {
        lines.pop();
    }
    let lines: Vec<&str> = lines.into_iter().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return None;
    }

    let mut best: Option<(u8, usize)> = None;

    for &delimiter in candidates {
        let mut counts = lines.iter().map(|line| count_unquoted(line, delimiter));
        let Some(first) = counts.next() else {
            continue;
        };
        if first == 0 || counts.any(|c| c != first) {
            continue;
        }

        match best {
            Some((_, best_count)) if best_count >= first => {}
            _ => best = Some((delimiter, first)),
        }
    }

    best.map(|(delimiter, _)| delimiter)
}

/// Count delimiter occurrences outside double-quoted sections.
fn count_unquoted(line: &str, delimiter: u8) -> usize {
    let mut quoted = false;
    let mut count = 0;
    for &b in line.as_bytes() {
        if b == b'"' {
            quoted = !quoted;
        } else if b == delimiter && !quoted {
            count += 1;
        }
    }
    count
}

impl Dialect {
    /// Infer the full dialect of a table's text. Falls back to the first
    /// candidate (or a comma) when no delimiter sniffs consistently, e.g. for
    /// single-column tables.
    pub fn infer(text: &str, candidates: &[u8]) -> Self {
        let delimiter = sniff_delimiter(text, candidates)
            .or_else(|| candidates.first().copied())
            .unwrap_or(b',');

        Self {
            delimiter,
            crlf: text.contains("\r\n"),
            trailing_newline: text.is_empty() || text.ends_with('\n'),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_comma() {
        let text = "a,b,c\n1,2,3\n4,5,6\n";
        assert_eq!(sniff_delimiter(text, DEFAULT_DELIMITERS), Some(b','));
    }

    #[test]
    fn sniffs_tab() {
        let text = "a\tb\n1\t2\n";
        assert_eq!(sniff_delimiter(text, DEFAULT_DELIMITERS), Some(b'\t'));
    }

    #[test]
    fn quoted_delimiters_are_ignored() {
        let text = "name,note\nbob,\"hi, there\"\n";
        assert_eq!(sniff_delimiter(text, DEFAULT_DELIMITERS), Some(b','));
    }

    #[test]
    fn inconsistent_text_is_not_a_table() {
        let text = "This is my\ntest text file, with a comma.\n";
        assert_eq!(sniff_delimiter(text, DEFAULT_DELIMITERS), None);
    }

    #[test]
    fn truncated_last_line_is_ignored() {
        let text = "a,b,c\n1,2,3\n4,5";
        assert_eq!(sniff_delimiter(text, DEFAULT_DELIMITERS), Some(b','));
    }

    #[test]
    fn more_fields_wins_between_consistent_candidates() {
        let text = "a\tb,c,d\n1\t2,3,4\n";
        assert_eq!(sniff_delimiter(text, DEFAULT_DELIMITERS), Some(b','));
    }

    #[test]
    fn infer_line_layout() {
        let dialect = Dialect::infer("a,b\r\n1,2", DEFAULT_DELIMITERS);
        assert_eq!(dialect.delimiter, b',');
        assert!(dialect.crlf);
        assert!(!dialect.trailing_newline);
    }

    #[test]
    fn infer_single_column_falls_back() {
        let dialect = Dialect::infer("one\ntwo\n", b"\t,");
        assert_eq!(dialect.delimiter, b'\t');
        assert!(dialect.trailing_newline);
    }
}
