// ============================================================
// Layer 4: Sentence Preprocessor
// ============================================================
// Shapes raw sentences before tokenisation.
//
// Steps (applied in order):
//   1. Replace each newline with " [SEP] " so paragraph breaks
//      become separator tokens instead of vanishing as whitespace
//   2. Pad short sentences with literal '0' characters, or
//      truncate long ones, so every sentence has exactly
//      `max_length - 2` characters (two slots are reserved for
//      the sentinel tokens added after tokenisation)
//
// All lengths are counted in chars, never bytes, so multi-byte
// scripts are cut on character boundaries.

/// Placeholder character used to pad short sentences.
pub const PAD_CHAR: char = '0';

/// Separator token that replaces line breaks.
pub const LINE_SEP: &str = " [SEP] ";

pub struct Preprocessor {
    /// Target length of the sentence body, in characters
    body_len: usize,
}

impl Preprocessor {
    /// `max_length` is the full sequence length including the two
    /// sentinel slots.
    pub fn new(max_length: usize) -> Self {
        Self { body_len: max_length.saturating_sub(2) }
    }

    pub fn body_len(&self) -> usize {
        self.body_len
    }

    /// Replace line breaks with the separator token.
    pub fn mark_lines(&self, text: &str) -> String {
        text.replace('\n', LINE_SEP)
    }

    /// Pad or truncate `text` to exactly `body_len` characters.
    pub fn fit(&self, text: &str) -> String {
        let len = text.chars().count();
        if len < self.body_len {
            let mut out = String::with_capacity(text.len() + self.body_len - len);
            out.push_str(text);
            out.extend(std::iter::repeat(PAD_CHAR).take(self.body_len - len));
            out
        } else {
            text.chars().take(self.body_len).collect()
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pads_short_sentence_with_zeros() {
        let p = Preprocessor::new(8);
        assert_eq!(p.fit("abc"), "abc000");
    }

    #[test]
    fn test_truncates_long_sentence() {
        let p = Preprocessor::new(6);
        assert_eq!(p.fit("abcdefgh"), "abcd");
    }

    #[test]
    fn test_exact_length_is_unchanged() {
        let p = Preprocessor::new(6);
        assert_eq!(p.fit("abcd"), "abcd");
    }

    #[test]
    fn test_truncates_on_char_boundaries() {
        let p = Preprocessor::new(4);
        assert_eq!(p.fit("你好世界"), "你好");
    }

    #[test]
    fn test_newlines_become_separators() {
        let p = Preprocessor::new(10);
        assert_eq!(p.mark_lines("a\nb"), "a [SEP] b");
    }

    #[test]
    fn test_tiny_max_length_gives_empty_body() {
        let p = Preprocessor::new(1);
        assert_eq!(p.body_len(), 0);
        assert_eq!(p.fit("abc"), "");
    }
}
