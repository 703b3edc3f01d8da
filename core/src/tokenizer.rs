use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SEQUENCE_LINE: Regex = Regex::new(r"^\d+$").expect("valid regex");
    static ref TIMESTAMP_LINE: Regex =
        Regex::new(r"^\d{1,2}:\d{2}:\d{2}[,.]\d{1,3}\s*-->\s*\d{1,2}:\d{2}:\d{2}[,.]\d{1,3}$").expect("valid regex");
}

/// True for SRT cue index lines and `start --> end` timing lines.
fn is_cue_marker(line: &str) -> bool {
    SEQUENCE_LINE.is_match(line) || TIMESTAMP_LINE.is_match(line)
}

/// Lines of subtitle text with cue markers and blank lines removed.
pub fn dialogue_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !is_cue_marker(line))
}

/// Normalize SRT-formatted text into lowercase whitespace tokens.
///
/// No stemming or stop-word removal is applied, so query and document
/// tokens compare on their exact lowercase spelling.
pub fn normalize(text: &str) -> Vec<String> {
    let joined = dialogue_lines(text).collect::<Vec<_>>().join(" ").to_lowercase();
    joined.split_whitespace().map(str::to_string).collect()
}
