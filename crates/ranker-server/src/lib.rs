//! HTTP gateway for the resume ranker (used by the `ranker` binary and tests).

pub mod gateway;
