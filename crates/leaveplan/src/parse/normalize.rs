//! Cleanup of raw OCR output.

/// Maps typographic characters OCR engines like to emit onto their ASCII
/// equivalents so that they survive the non-ASCII strip.
fn fold_char(c: char) -> Option<char> {
    match c {
        '\u{2010}'..='\u{2015}' | '\u{2212}' => Some('-'),
        '\u{00A0}' | '\u{2007}' | '\u{202F}' => Some(' '),
        '\u{2018}' | '\u{2019}' => Some('\''),
        '\t' => Some('\t'),
        c if c.is_ascii_graphic() || c == ' ' => Some(c),
        _ => None,
    }
}

/// Removes non-printable and non-ASCII characters from a single line.
pub fn clean_line(line: &str) -> String {
    line.chars().filter_map(fold_char).collect()
}

/// Splits raw OCR text into trimmed, non-empty, ASCII-only lines.
///
/// Never fails: garbage or empty input simply yields no lines.
pub fn normalize_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(clean_line)
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// The whole text with the same character cleanup applied, line structure
/// preserved.
pub fn clean_text(raw: &str) -> String {
    raw.lines().map(clean_line).collect::<Vec<_>>().join("\n")
}
