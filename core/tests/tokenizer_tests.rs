use subsearch_core::tokenizer::{dialogue_lines, normalize};

#[test]
fn it_strips_cue_markers() {
    let toks = normalize("1\n00:00:01,000 --> 00:00:02,000\nHello world\n\n");
    assert_eq!(toks, vec!["hello".to_string(), "world".to_string()]);
}

#[test]
fn it_handles_crlf_and_multiple_cues() {
    let srt = "1\r\n00:00:01,000 --> 00:00:02,500\r\nWhat a FUNNY day\r\n\r\n2\r\n00:00:03,000 --> 00:00:04,000\r\n  Indeed.  \r\n";
    let words = normalize(srt);
    assert_eq!(words, vec!["what", "a", "funny", "day", "indeed."]);
}

#[test]
fn it_keeps_lines_that_only_look_numeric() {
    let lines: Vec<&str> = dialogue_lines("12\n12 monkeys\n00:00:01.000 --> 00:00:02.000\n10:30 tonight\n").collect();
    assert_eq!(lines, vec!["12 monkeys", "10:30 tonight"]);
}

#[test]
fn it_does_not_stem_or_drop_stopwords() {
    let words = normalize("The runners were Running");
    assert_eq!(words, vec!["the", "runners", "were", "running"]);
}
