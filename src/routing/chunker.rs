//! Splits rendered responses into transport-sized fragments

use serde::{Deserialize, Serialize};

/// One transport-sized piece of a response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub index: usize,
    pub text: String,
}

/// Split `text` into fragments of at most `max_len` characters.
///
/// Boundaries always fall between `char`s, so every fragment is valid UTF-8
/// on its own and concatenating the fragments in order gives back `text`.
/// Text that already fits (the empty string included) yields one fragment.
/// A `max_len` of zero is treated as one.
pub fn split(text: &str, max_len: usize) -> Vec<Fragment> {
    let max_len = max_len.max(1);
    let mut fragments = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (offset, _) in text.char_indices() {
        if count == max_len {
            fragments.push(fragment(fragments.len(), &text[start..offset]));
            start = offset;
            count = 0;
        }
        count += 1;
    }

    fragments.push(fragment(fragments.len(), &text[start..]));
    fragments
}

fn fragment(index: usize, text: &str) -> Fragment {
    Fragment {
        index,
        text: text.to_string(),
    }
}
