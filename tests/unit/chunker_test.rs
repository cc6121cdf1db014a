//! Unit tests for response chunking

use chat_relay_gateway::routing::split;

fn joined(text: &str, max_len: usize) -> String {
    split(text, max_len).into_iter().map(|f| f.text).collect()
}

#[test]
fn test_9000_chars_into_three_fragments() {
    let text = "a".repeat(9000);
    let fragments = split(&text, 4000);

    assert_eq!(fragments.len(), 3);
    assert_eq!(fragments[0].text.len(), 4000);
    assert_eq!(fragments[1].text.len(), 4000);
    assert_eq!(fragments[2].text.len(), 1000);
    assert_eq!(joined(&text, 4000), text);
}

#[test]
fn test_fragment_indexes_are_sequential() {
    let fragments = split(&"z".repeat(25), 10);
    let indexes: Vec<_> = fragments.iter().map(|f| f.index).collect();
    assert_eq!(indexes, vec![0, 1, 2]);
}

#[test]
fn test_text_at_limit_is_single_fragment() {
    let text = "b".repeat(4000);
    assert_eq!(split(&text, 4000).len(), 1);
    assert_eq!(split(&format!("{}c", text), 4000).len(), 2);
}

#[test]
fn test_reconstruction_with_mixed_scripts() {
    let samples = [
        "plain ascii text with spaces",
        "Ünïcödé ñ ç ø",
        "日本語のテキストを分割する",
        "emoji 🔷🤖🔄 and ═══ box drawing",
        "line\nbreaks\r\nand\ttabs",
    ];

    for text in samples {
        for max_len in [1, 2, 3, 7, 64] {
            let fragments = split(text, max_len);
            assert!(
                fragments.iter().all(|f| f.text.chars().count() <= max_len),
                "fragment over {} chars for {:?}",
                max_len,
                text
            );
            assert_eq!(joined(text, max_len), text);
        }
    }
}

#[test]
fn test_split_is_deterministic() {
    let text = "🔷 Gemini Pro:\n".repeat(300);
    assert_eq!(split(&text, 97), split(&text, 97));
}
