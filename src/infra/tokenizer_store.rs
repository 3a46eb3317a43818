// ============================================================
// Layer 6: Tokenizer Store
// ============================================================
// Loads the tokenizer used by the builder.
//
// Two file kinds are accepted:
//   - *.json  a serialized HuggingFace tokenizer, loaded as is
//   - other   a BERT-style vocab.txt (one token per line, id =
//             line number), turned into a WordPiece tokenizer
//
// For vocab.txt we write the tokenizer JSON ourselves and parse
// it back. The JSON format is the stable interface of the
// tokenizers crate, so this sidesteps builder API differences
// between releases.

use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use tokenizers::Tokenizer;

use crate::domain::traits::SequenceEncoder;

/// Tokens registered as special when the vocabulary contains them.
/// Special tokens are matched whole in the input text, so a literal
/// "[SEP]" inserted by the preprocessor maps to one id.
const SPECIAL_TOKENS: [&str; 5] = ["[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]"];

pub struct TokenizerStore {
    path: PathBuf,
}

impl TokenizerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<Tokenizer> {
        let is_json = self.path.extension().and_then(|e| e.to_str()) == Some("json");
        let tokenizer = if is_json {
            Tokenizer::from_file(&self.path).map_err(|e| anyhow!(
                "Cannot load tokenizer from '{}': {}", self.path.display(), e
            ))?
        } else {
            let text = std::fs::read_to_string(&self.path)
                .with_context(|| format!("Cannot read vocab '{}'", self.path.display()))?;
            from_vocab_lines(text.lines())?
        };

        tracing::info!(
            "Tokenizer loaded from '{}' ({} entries)",
            self.path.display(),
            tokenizer.get_vocab_size(true)
        );
        Ok(tokenizer)
    }
}

/// Build a WordPiece tokenizer from vocab.txt lines.
pub fn from_vocab_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Result<Tokenizer> {
    let mut vocab = serde_json::Map::new();
    for (id, line) in lines.into_iter().enumerate() {
        let token = line.trim_end_matches('\r');
        if token.is_empty() {
            continue;
        }
        // first occurrence wins, as in BERT's vocab loading
        vocab.entry(token.to_string()).or_insert_with(|| serde_json::json!(id));
    }

    let added_tokens: Vec<serde_json::Value> = SPECIAL_TOKENS
        .iter()
        .filter_map(|t| vocab.get(*t).map(|id| (t, id.clone())))
        .map(|(t, id)| serde_json::json!({
            "id": id, "content": t, "single_word": false, "lstrip": false,
            "rstrip": false, "normalized": false, "special": true
        }))
        .collect();

    let unk = if vocab.contains_key("[UNK]") { "[UNK]" } else { "<unk>" };

    let tokenizer_json = serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": added_tokens,
        "normalizer": {
            "type": "BertNormalizer",
            "clean_text": true,
            "handle_chinese_chars": true,
            "strip_accents": null,
            "lowercase": true
        },
        "pre_tokenizer": { "type": "BertPreTokenizer" },
        "post_processor": null,
        "decoder": { "type": "WordPiece", "prefix": "##", "cleanup": true },
        "model": {
            "type": "WordPiece",
            "unk_token": unk,
            "continuing_subword_prefix": "##",
            "max_input_chars_per_word": 100,
            "vocab": vocab
        }
    });

    let bytes = serde_json::to_vec(&tokenizer_json)?;
    Tokenizer::from_bytes(bytes).map_err(|e| anyhow!("Cannot build WordPiece tokenizer: {e}"))
}

impl SequenceEncoder for Tokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let enc = (**self).encode(text, false)
            .map_err(|e| anyhow!("Tokenisation error: {e}"))?;
        Ok(enc.get_ids().to_vec())
    }

    fn token_id(&self, token: &str) -> Option<u32> {
        (**self).token_to_id(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VOCAB: &str = "[PAD]\n[UNK]\n[CLS]\n[SEP]\n[MASK]\n0\n你\n好\nhello\n##s\n";

    #[test]
    fn test_ids_follow_line_numbers() {
        let tok = from_vocab_lines(VOCAB.lines()).unwrap();
        assert_eq!(tok.token_id("[PAD]"), Some(0));
        assert_eq!(tok.token_id("[MASK]"), Some(4));
        assert_eq!(tok.token_id("hello"), Some(8));
    }

    #[test]
    fn test_chinese_chars_split_per_char() {
        let tok = from_vocab_lines(VOCAB.lines()).unwrap();
        assert_eq!(SequenceEncoder::encode(&tok, "你好").unwrap(), vec![6, 7]);
    }

    #[test]
    fn test_sep_marker_is_one_token() {
        let tok = from_vocab_lines(VOCAB.lines()).unwrap();
        let ids = SequenceEncoder::encode(&tok, "你 [SEP] 好").unwrap();
        assert_eq!(ids, vec![6, 3, 7]);
    }

    #[test]
    fn test_unknown_word_maps_to_unk() {
        let tok = from_vocab_lines(VOCAB.lines()).unwrap();
        assert_eq!(SequenceEncoder::encode(&tok, "world").unwrap(), vec![1]);
    }

    #[test]
    fn test_wordpiece_continuation() {
        let tok = from_vocab_lines(VOCAB.lines()).unwrap();
        assert_eq!(SequenceEncoder::encode(&tok, "hellos").unwrap(), vec![8, 9]);
    }

    #[test]
    fn test_store_reads_vocab_file() {
        let mut f = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        f.write_all(VOCAB.as_bytes()).unwrap();
        let tok = TokenizerStore::new(f.path()).load().unwrap();
        assert_eq!(tok.token_id("[CLS]"), Some(2));
    }

    #[test]
    fn test_store_reads_tokenizer_json() {
        let tok = from_vocab_lines(VOCAB.lines()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokenizer.json");
        tok.save(&path, false).unwrap();

        let loaded = TokenizerStore::new(&path).load().unwrap();
        assert_eq!(loaded.token_id("好"), Some(7));
    }
}
