use std::io;
use std::path::Path;

use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

/// Loads `tokenizer.json` from a model directory (or an explicit file path).
pub fn load_tokenizer(model_path: &Path) -> io::Result<Tokenizer> {
    let tokenizer_path = if model_path.is_dir() {
        model_path.join("tokenizer.json")
    } else {
        model_path.to_path_buf()
    };

    Tokenizer::from_file(&tokenizer_path).map_err(io::Error::other)
}

/// Loads a tokenizer configured for batched sentence encoding.
///
/// Sequences are truncated to `max_len` tokens and every batch is padded to
/// its longest member so the encodings stack into one rectangular tensor.
pub fn load_batch_tokenizer(model_path: &Path, max_len: usize) -> io::Result<Tokenizer> {
    let mut tokenizer = load_tokenizer(model_path)?;

    let truncation = TruncationParams {
        max_length: max_len,
        ..Default::default()
    };

    tokenizer
        .with_truncation(Some(truncation))
        .map_err(|e| io::Error::other(format!("Failed to configure truncation: {}", e)))?;

    tokenizer.with_padding(Some(PaddingParams {
        strategy: PaddingStrategy::BatchLongest,
        ..Default::default()
    }));

    Ok(tokenizer)
}
