//! bsbi-search — a disk-backed BSBI inverted-index search engine with
//! TF-IDF and BM25 retrieval.
//!
//! Building an index ([`bsbi::BsbiIndexer`]) walks a directory of blocks,
//! tokenizes each document with [`analyzer::Analyzer`], inverts each block
//! in memory, and external-merges the per-block intermediate indexes
//! ([`merge::merge_into`]) into one [`index_file::IndexReader`]-readable
//! index. Querying ([`retriever::retrieve_tfidf`], [`retriever::retrieve_bm25`])
//! opens that merged index term-at-a-time and ranks documents against it.

pub mod accumulate;
pub mod analyzer;
pub mod bsbi;
pub mod codec;
pub mod config;
pub mod error;
pub mod id_map;
pub mod index_file;
pub mod merge;
pub mod retriever;

pub use analyzer::Analyzer;
pub use bsbi::BsbiIndexer;
pub use codec::PostingsEncoding;
pub use config::{Bm25Params, IndexerConfig, RetrieverConfig};
pub use error::{IndexError, QueryError};
pub use id_map::IdMap;
pub use index_file::{IndexReader, IndexWriter};
pub use retriever::{retrieve_bm25, retrieve_tfidf};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
