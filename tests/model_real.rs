//! Tests against real model weights.
//!
//! Run with `RANKER_MODEL_DIR=/path/to/all-MiniLM-L6-v2 cargo test -- --ignored`.
//! The directory must hold `config.json`, `model.safetensors` and `tokenizer.json`.

mod common;

use common::fixtures::{DESIGNER_RESUME, PYTHON_RESUME, QUERY_TEXT, job_description, resumes};
use ranker::embedding::{EncoderConfig, SentenceEncoder, TextEncoder};
use ranker::ranking::RankingEngine;

fn load_real_encoder() -> Option<SentenceEncoder> {
    let config = EncoderConfig::from_env();
    if !config.model_available() {
        eprintln!("RANKER_MODEL_DIR not set or incomplete, skipping");
        return None;
    }
    Some(SentenceEncoder::load(config).expect("model should load"))
}

#[test]
#[ignore]
fn test_real_scenario_separates_candidates() {
    let Some(encoder) = load_real_encoder() else {
        return;
    };
    let engine = RankingEngine::new(encoder);

    let result = engine.rank(&job_description(), &resumes()).unwrap();

    assert_eq!(result.scores[0].candidate_id.as_str(), "resume-python");
    assert_eq!(result.scores[0].rank, 1);
    assert_eq!(result.scores[1].rank, 2);
    assert!(
        result.scores[0].similarity > 0.5,
        "relevant resume scored {}",
        result.scores[0].similarity
    );
    assert!(
        result.scores[1].similarity < 0.3,
        "unrelated resume scored {}",
        result.scores[1].similarity
    );
}

#[test]
#[ignore]
fn test_real_embeddings_are_unit_and_deterministic() {
    let Some(encoder) = load_real_encoder() else {
        return;
    };

    let first = encoder
        .embed(&[QUERY_TEXT, PYTHON_RESUME, DESIGNER_RESUME])
        .unwrap();
    let second = encoder.embed(&[QUERY_TEXT]).unwrap();

    assert_eq!(first.len(), 3);
    assert!(first.iter().all(|v| v.is_unit()));
    assert!(first.iter().all(|v| v.dim() == encoder.embedding_dim()));
    assert!(first[0].approx_eq(&second[0], 1e-5));
}

#[test]
#[ignore]
fn test_real_batch_matches_single_encoding() {
    let Some(encoder) = load_real_encoder() else {
        return;
    };

    let batch = encoder.embed(&[PYTHON_RESUME, DESIGNER_RESUME]).unwrap();
    let single = encoder.embed_one(DESIGNER_RESUME).unwrap();

    assert!(batch[1].approx_eq(&single, 1e-4));
}
