//! Documents used across integration tests.

use ranker::ranking::Document;

pub const QUERY_ID: &str = "job-fastapi";

pub const QUERY_TEXT: &str = "Senior Python developer with FastAPI experience";

pub const PYTHON_RESUME: &str = "Python backend engineer, 5 years FastAPI";

pub const DESIGNER_RESUME: &str = "Graphic designer with Photoshop skills";

pub fn job_description() -> Document {
    Document::query(QUERY_ID, QUERY_TEXT)
}

pub fn resumes() -> Vec<Document> {
    vec![
        Document::candidate("resume-python", PYTHON_RESUME),
        Document::candidate("resume-designer", DESIGNER_RESUME),
    ]
}

/// A larger pool: `n` generic resumes plus the two scenario resumes at the end.
pub fn resume_pool(n: usize) -> Vec<Document> {
    let mut pool: Vec<Document> = (0..n)
        .map(|i| {
            Document::candidate(
                format!("resume-{:03}", i),
                format!("Candidate {} with experience in field {}", i, i % 7),
            )
        })
        .collect();
    pool.extend(resumes());
    pool
}
