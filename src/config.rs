//! Tunable defaults for indexing and retrieval.
//!
//! Grounded on the teacher's `Bm25Params` (profiles/mod.rs): a small
//! `Default`-able struct of weighting constants passed explicitly to the
//! scorer rather than read from ambient global state.

use crate::codec::PostingsEncoding;

/// Index naming and on-disk encoding choice for a [`crate::bsbi::BsbiIndexer`] run.
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    pub index_name: String,
    pub postings_encoding: PostingsEncoding,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            index_name: "main_index".to_string(),
            postings_encoding: PostingsEncoding::Vbe,
        }
    }
}

/// BM25 weighting constants. Defaults (`k1 = 10.0`, `b = 0.5`) match the
/// distilled specification's preserved defaults rather than the commonly
/// cited `k1 = 1.2`.
#[derive(Debug, Clone, Copy)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 10.0, b: 0.5 }
    }
}

/// How many ranked results a query returns.
#[derive(Debug, Clone, Copy)]
pub struct RetrieverConfig {
    pub top_k: usize,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self { top_k: 10 }
    }
}
