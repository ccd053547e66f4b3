//! Blocked Sort-Based Indexing: parse each block of documents into
//! `(termID, docID)` pairs, invert each block in memory, write one
//! intermediate index per block, then external-merge all blocks into the
//! final index.
//!
//! Grounded on `bsbi.py`'s `parse_block` / `invert_write` / `build_index`
//! pipeline, restructured into an accumulate-then-flush two-phase shape
//! (`index_batch` / `commit`) rather than the original's single monolithic
//! function.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::analyzer::Analyzer;
use crate::codec::PostingsEncoding;
use crate::config::IndexerConfig;
use crate::error::IndexError;
use crate::id_map::IdMap;
use crate::index_file::{IndexReader, IndexWriter};
use crate::merge::merge_into;

const TERM_MAP_FILE: &str = "term_ids.idmap";
const DOC_MAP_FILE: &str = "doc_ids.idmap";
const TERM_MAP_MAGIC: &[u8; 4] = b"IDTM";
const DOC_MAP_MAGIC: &[u8; 4] = b"IDDM";
const ENCODING_FILE: &str = "encoding";
const BLOCK_PREFIX: &str = "block";

/// Drives a full BSBI build: parse -> invert -> per-block write -> merge.
pub struct BsbiIndexer {
    data_dir: PathBuf,
    output_dir: PathBuf,
    index_name: String,
    encoding: PostingsEncoding,
}

impl BsbiIndexer {
    pub fn new(data_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>, encoding: PostingsEncoding) -> Self {
        Self {
            data_dir: data_dir.into(),
            output_dir: output_dir.into(),
            index_name: "main_index".to_string(),
            encoding,
        }
    }

    pub fn with_index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = name.into();
        self
    }

    /// Build from a bundled [`IndexerConfig`] (`index_name` +
    /// `postings_encoding`) rather than a bare encoding selector.
    pub fn with_config(data_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>, config: IndexerConfig) -> Self {
        Self::new(data_dir, output_dir, config.postings_encoding).with_index_name(config.index_name)
    }

    /// Run the full build, leaving `<output_dir>/<index_name>.{index,dict}`
    /// plus persisted term/doc id maps behind. Returns the number of
    /// documents indexed.
    pub fn build(&self) -> Result<usize, IndexError> {
        let start = std::time::Instant::now();
        std::fs::create_dir_all(&self.output_dir)?;

        let blocks = discover_blocks(&self.data_dir)?;
        let analyzer = Analyzer::new();
        let mut term_map = IdMap::new();
        let mut doc_map = IdMap::new();
        let mut block_readers = Vec::with_capacity(blocks.len());

        for (i, block_dir) in blocks.iter().enumerate() {
            let pairs = parse_block(block_dir, &analyzer, &mut term_map, &mut doc_map)?;
            let postings = invert_block(&pairs);

            let block_name = format!("{BLOCK_PREFIX}{i}");
            let mut writer = IndexWriter::create(&self.output_dir, &block_name, self.encoding)?;
            for (term_id, doc_ids, tfs) in &postings {
                writer.append(*term_id, doc_ids, tfs)?;
            }
            writer.close()?;
            log::debug!(
                "indexed block {}: {} docs in this block, {} distinct terms",
                block_dir.display(),
                block_documents(block_dir)?.len(),
                postings.len()
            );

            block_readers.push(IndexReader::open(&self.output_dir, &block_name, self.encoding)?);
        }

        let mut main_writer = IndexWriter::create(&self.output_dir, &self.index_name, self.encoding)?;
        merge_into(block_readers, &mut main_writer)?;
        main_writer.close()?;

        term_map.save(&self.output_dir.join(TERM_MAP_FILE), TERM_MAP_MAGIC)?;
        doc_map.save(&self.output_dir.join(DOC_MAP_FILE), DOC_MAP_MAGIC)?;
        std::fs::write(
            self.output_dir.join(ENCODING_FILE),
            match self.encoding {
                PostingsEncoding::Standard => "standard",
                PostingsEncoding::Vbe => "vbe",
            },
        )?;

        for i in 0..blocks.len() {
            let block_name = format!("{BLOCK_PREFIX}{i}");
            let _ = std::fs::remove_file(self.output_dir.join(format!("{block_name}.index")));
            let _ = std::fs::remove_file(self.output_dir.join(format!("{block_name}.dict")));
        }

        log::info!(
            "built index '{}': {} blocks, {} docs, {} terms in {:?}",
            self.index_name,
            blocks.len(),
            doc_map.len(),
            term_map.len(),
            start.elapsed()
        );

        Ok(doc_map.len())
    }
}

/// Load the term/doc id maps a prior [`BsbiIndexer::build`] persisted.
pub fn load_id_maps(output_dir: &Path) -> Result<(IdMap, IdMap), IndexError> {
    let term_map = IdMap::load(&output_dir.join(TERM_MAP_FILE), TERM_MAP_MAGIC)?;
    let doc_map = IdMap::load(&output_dir.join(DOC_MAP_FILE), DOC_MAP_MAGIC)?;
    Ok((term_map, doc_map))
}

/// Load the postings encoding a prior [`BsbiIndexer::build`] persisted.
pub fn load_encoding(output_dir: &Path) -> Result<PostingsEncoding, IndexError> {
    let contents = std::fs::read_to_string(output_dir.join(ENCODING_FILE))?;
    match contents.as_str() {
        "standard" => Ok(PostingsEncoding::Standard),
        "vbe" => Ok(PostingsEncoding::Vbe),
        other => Err(IndexError::IndexIntegrity(format!(
            "unrecognized encoding marker '{other}'"
        ))),
    }
}

/// A directory's immediate sub-directories, sorted by name, are its blocks.
/// A directory with no sub-directories is itself treated as a single block.
fn discover_blocks(data_dir: &Path) -> Result<Vec<PathBuf>, IndexError> {
    let mut subdirs: Vec<PathBuf> = std::fs::read_dir(data_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    subdirs.sort();

    if subdirs.is_empty() {
        Ok(vec![data_dir.to_path_buf()])
    } else {
        Ok(subdirs)
    }
}

/// Every regular file directly inside `block_dir`, sorted by filename.
fn block_documents(block_dir: &Path) -> Result<Vec<PathBuf>, IndexError> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(block_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Tokenize every document in `block_dir`, emitting `(termID, docID)` pairs
/// in document order. `term_map`/`doc_map` are shared across blocks so ids
/// stay globally unique and monotonically assigned in first-seen order.
fn parse_block(
    block_dir: &Path,
    analyzer: &Analyzer,
    term_map: &mut IdMap,
    doc_map: &mut IdMap,
) -> Result<Vec<(u32, u32)>, IndexError> {
    let mut pairs = Vec::new();
    for doc_path in block_documents(block_dir)? {
        let text = std::fs::read_to_string(&doc_path)?;
        let mut doc_id = None;
        for term in analyzer.analyze(&text) {
            let doc_id = *doc_id.get_or_insert_with(|| doc_map.get_or_assign(&doc_path.to_string_lossy()));
            let term_id = term_map.get_or_assign(&term);
            pairs.push((term_id, doc_id));
        }
    }
    Ok(pairs)
}

/// In-memory inversion of one block's `(termID, docID)` stream into
/// termID-ascending `(termID, doc_ids, tfs)` postings, each with doc_ids
/// strictly increasing.
fn invert_block(pairs: &[(u32, u32)]) -> Vec<(u32, Vec<u32>, Vec<u32>)> {
    let mut counts: FxHashMap<u32, BTreeMap<u32, u32>> = FxHashMap::default();
    for &(term_id, doc_id) in pairs {
        *counts.entry(term_id).or_default().entry(doc_id).or_insert(0) += 1;
    }

    let mut terms: Vec<u32> = counts.keys().copied().collect();
    terms.sort_unstable();

    terms
        .into_iter()
        .map(|term_id| {
            let doc_counts = &counts[&term_id];
            let doc_ids: Vec<u32> = doc_counts.keys().copied().collect();
            let tfs: Vec<u32> = doc_counts.values().copied().collect();
            (term_id, doc_ids, tfs)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_doc(dir: &Path, name: &str, text: &str) {
        std::fs::write(dir.join(name), text).unwrap();
    }

    #[test]
    fn with_config_honors_bundled_index_name_and_encoding() {
        let data_dir = tempdir().unwrap();
        write_doc(data_dir.path(), "doc0.txt", "cat dog");

        let output_dir = tempdir().unwrap();
        let config = IndexerConfig {
            index_name: "custom_index".to_string(),
            postings_encoding: PostingsEncoding::Standard,
        };
        BsbiIndexer::with_config(data_dir.path(), output_dir.path(), config)
            .build()
            .unwrap();

        let reader = IndexReader::open(output_dir.path(), "custom_index", PostingsEncoding::Standard).unwrap();
        assert_eq!(reader.term_count(), 2);
    }

    #[test]
    fn single_block_matches_literal_example() {
        // S3: doc0 = "the cat sat on the mat", doc1 = "a cat and a dog"
        let data_dir = tempdir().unwrap();
        write_doc(data_dir.path(), "doc0.txt", "the cat sat on the mat");
        write_doc(data_dir.path(), "doc1.txt", "a cat and a dog");

        let output_dir = tempdir().unwrap();
        let indexer = BsbiIndexer::new(data_dir.path(), output_dir.path(), PostingsEncoding::Vbe);
        let doc_count = indexer.build().unwrap();
        assert_eq!(doc_count, 2);

        let (term_map, doc_map) = load_id_maps(output_dir.path()).unwrap();
        let mut reader = IndexReader::open(output_dir.path(), "main_index", PostingsEncoding::Vbe).unwrap();

        let cat_id = term_map.id_of("cat").unwrap();
        let (docs, tfs) = reader.get(cat_id).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(tfs, vec![1, 1]);

        let doc0 = doc_map.id_of(&data_dir.path().join("doc0.txt").to_string_lossy()).unwrap();
        let doc1 = doc_map.id_of(&data_dir.path().join("doc1.txt").to_string_lossy()).unwrap();
        assert!(docs.contains(&doc0));
        assert!(docs.contains(&doc1));
    }

    #[test]
    fn two_blocks_merge_to_same_result_as_one_block() {
        let single_dir = tempdir().unwrap();
        write_doc(single_dir.path(), "doc0.txt", "the cat sat on the mat");
        write_doc(single_dir.path(), "doc1.txt", "a cat and a dog");
        let single_out = tempdir().unwrap();
        BsbiIndexer::new(single_dir.path(), single_out.path(), PostingsEncoding::Standard)
            .build()
            .unwrap();

        let multi_dir = tempdir().unwrap();
        std::fs::create_dir_all(multi_dir.path().join("block0")).unwrap();
        std::fs::create_dir_all(multi_dir.path().join("block1")).unwrap();
        write_doc(&multi_dir.path().join("block0"), "doc0.txt", "the cat sat on the mat");
        write_doc(&multi_dir.path().join("block1"), "doc1.txt", "a cat and a dog");
        let multi_out = tempdir().unwrap();
        BsbiIndexer::new(multi_dir.path(), multi_out.path(), PostingsEncoding::Standard)
            .build()
            .unwrap();

        let (single_terms, _) = load_id_maps(single_out.path()).unwrap();
        let (multi_terms, _) = load_id_maps(multi_out.path()).unwrap();
        assert_eq!(single_terms.len(), multi_terms.len());

        let mut single_reader =
            IndexReader::open(single_out.path(), "main_index", PostingsEncoding::Standard).unwrap();
        let mut multi_reader =
            IndexReader::open(multi_out.path(), "main_index", PostingsEncoding::Standard).unwrap();

        for term in ["cat", "sat", "dog", "mat"] {
            let single_id = single_terms.id_of(term).unwrap();
            let multi_id = multi_terms.id_of(term).unwrap();
            let (_, single_tfs) = single_reader.get(single_id).unwrap();
            let (_, multi_tfs) = multi_reader.get(multi_id).unwrap();
            assert_eq!(single_tfs, multi_tfs);
        }
    }

    #[test]
    fn invert_block_groups_and_sorts() {
        let pairs = vec![(1, 3), (0, 0), (1, 0), (0, 0), (1, 3)];
        let postings = invert_block(&pairs);
        assert_eq!(postings[0].0, 0);
        assert_eq!(postings[0].1, vec![0]);
        assert_eq!(postings[0].2, vec![2]);
        assert_eq!(postings[1].0, 1);
        assert_eq!(postings[1].1, vec![0, 3]);
        assert_eq!(postings[1].2, vec![1, 2]);
    }
}
