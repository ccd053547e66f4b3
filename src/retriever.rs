//! Term-at-a-time TF-IDF and BM25 retrieval over a merged index.
//!
//! Grounded on `bsbi.py::retrieve_tfidf`/`retrieve_bm25`: per-term
//! accumulators combined by the same sorted-merge used to build the index
//! ([`crate::accumulate::sorted_merge`], here summing partial `f64` scores
//! instead of `u32` term frequencies), then a score-descending, docID-
//! ascending-tiebreak top-k selection. The original's accumulator list is
//! built by repeated in-place `.sort()`+reverse; this port keeps the
//! function pure and adds the ascending-docID tiebreak explicitly rather
//! than leaving final order dependent on sort stability or the source's
//! sort-reverse-reverse idiom.

use crate::accumulate::sorted_merge;
use crate::analyzer::Analyzer;
use crate::config::Bm25Params;
use crate::error::QueryError;
use crate::id_map::IdMap;
use crate::index_file::IndexReader;

/// Rank documents against `query` by TF-IDF, returning up to `top_k`
/// `(score, doc_path)` pairs sorted score-descending, ties broken by
/// ascending docID. Unknown query terms and terms absent from the index
/// are silently skipped; an empty or all-unknown query yields `[]`.
pub fn retrieve_tfidf(
    query: &str,
    analyzer: &Analyzer,
    term_map: &IdMap,
    doc_map: &IdMap,
    reader: &mut IndexReader,
    top_k: usize,
) -> Result<Vec<(f64, String)>, QueryError> {
    retrieve_with_weighting(query, analyzer, term_map, doc_map, reader, top_k, |tf, _doc_id| {
        if tf > 0 {
            1.0 + (tf as f64).log10()
        } else {
            0.0
        }
    })
}

/// Rank documents against `query` by BM25, returning up to `top_k`
/// `(score, doc_path)` pairs. Same term-skipping and tiebreak rules as
/// [`retrieve_tfidf`].
pub fn retrieve_bm25(
    query: &str,
    analyzer: &Analyzer,
    term_map: &IdMap,
    doc_map: &IdMap,
    reader: &mut IndexReader,
    params: Bm25Params,
    top_k: usize,
) -> Result<Vec<(f64, String)>, QueryError> {
    let doc_length: std::collections::HashMap<u32, u32> = reader.doc_length().clone();
    let avdl = if doc_length.is_empty() {
        0.0
    } else {
        doc_length.values().copied().sum::<u32>() as f64 / doc_length.len() as f64
    };
    let k1 = params.k1;
    let b = params.b;

    retrieve_with_weighting(query, analyzer, term_map, doc_map, reader, top_k, move |tf, doc_id| {
        let dl = *doc_length.get(&doc_id).unwrap_or(&0) as f64;
        let numerator = (k1 + 1.0) * tf as f64;
        let denom = k1 * ((1.0 - b) + b * dl / avdl) + tf as f64;
        numerator / denom
    })
}

fn retrieve_with_weighting<F>(
    query: &str,
    analyzer: &Analyzer,
    term_map: &IdMap,
    doc_map: &IdMap,
    reader: &mut IndexReader,
    top_k: usize,
    wtd: F,
) -> Result<Vec<(f64, String)>, QueryError>
where
    F: Fn(u32, u32) -> f64,
{
    let start = std::time::Instant::now();
    let n = reader.doc_length().len() as f64;
    let mut acc: Option<(Vec<u32>, Vec<f64>)> = None;

    for term in analyzer.analyze(query) {
        let Some(term_id) = term_map.id_of(&term) else {
            continue;
        };
        let Some(entry) = reader.directory_entry(term_id) else {
            continue;
        };
        let df = entry.df as f64;
        let (doc_ids, tfs) = reader.get(term_id)?;
        let wtq = (n / df).log10();
        let scores: Vec<f64> = doc_ids
            .iter()
            .zip(tfs.iter())
            .map(|(&d, &tf)| wtd(tf, d) * wtq)
            .collect();

        acc = Some(match acc.take() {
            None => (doc_ids, scores),
            Some((cur_docs, cur_scores)) => sorted_merge(&cur_docs, &cur_scores, &doc_ids, &scores),
        });
    }

    let Some((doc_ids, scores)) = acc else {
        log::debug!("query {query:?}: no matching terms, took {:?}", start.elapsed());
        return Ok(Vec::new());
    };

    let mut candidates: Vec<(u32, f64)> = doc_ids.into_iter().zip(scores).collect();
    candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then(a.0.cmp(&b.0)));
    candidates.truncate(top_k);

    let results: Vec<(f64, String)> = candidates
        .into_iter()
        .filter_map(|(doc_id, score)| doc_map.str_of(doc_id).map(|path| (score, path.to_string())))
        .collect();
    log::debug!(
        "query {query:?}: {} results, took {:?}",
        results.len(),
        start.elapsed()
    );
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::PostingsEncoding;
    use crate::index_file::IndexWriter;
    use tempfile::tempdir;

    /// Build the S3 index directly (bypassing the indexer) and return the
    /// pieces retrieval needs.
    fn s3_index() -> (Analyzer, IdMap, IdMap, IndexReader, tempfile::TempDir) {
        let analyzer = Analyzer::new();
        let mut term_map = IdMap::new();
        let mut doc_map = IdMap::new();

        let doc0 = doc_map.get_or_assign("a.txt");
        let doc1 = doc_map.get_or_assign("b.txt");

        let cat = term_map.get_or_assign("cat");
        let sat = term_map.get_or_assign("sat");
        let mat = term_map.get_or_assign("mat");
        let dog = term_map.get_or_assign("dog");
        assert_eq!(doc0, 0);
        assert_eq!(doc1, 1);

        let dir = tempdir().unwrap();
        let mut w = IndexWriter::create(dir.path(), "main_index", PostingsEncoding::Vbe).unwrap();
        w.append(cat, &[doc0, doc1], &[1, 1]).unwrap();
        w.append(sat, &[doc0], &[1]).unwrap();
        w.append(mat, &[doc0], &[1]).unwrap();
        w.append(dog, &[doc1], &[1]).unwrap();
        w.close().unwrap();

        let reader = IndexReader::open(dir.path(), "main_index", PostingsEncoding::Vbe).unwrap();
        (analyzer, term_map, doc_map, reader, dir)
    }

    #[test]
    fn s4_tfidf_cat_ties_broken_by_ascending_doc_id() {
        let (analyzer, term_map, doc_map, mut reader, _dir) = s3_index();
        let results = retrieve_tfidf("cat", &analyzer, &term_map, &doc_map, &mut reader, 10).unwrap();
        assert_eq!(results, vec![(0.0, "a.txt".to_string()), (0.0, "b.txt".to_string())]);
    }

    #[test]
    fn s4_tfidf_dog() {
        let (analyzer, term_map, doc_map, mut reader, _dir) = s3_index();
        let results = retrieve_tfidf("dog", &analyzer, &term_map, &doc_map, &mut reader, 10).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].1, "b.txt");
        assert!((results[0].0 - 0.30103).abs() < 1e-4);
    }

    #[test]
    fn s5_bm25_dog() {
        let (analyzer, term_map, doc_map, mut reader, _dir) = s3_index();
        let params = Bm25Params { k1: 1.2, b: 0.75 };
        let results = retrieve_bm25("dog", &analyzer, &term_map, &doc_map, &mut reader, params, 10).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].1, "b.txt");
        assert!((results[0].0 - 0.3279).abs() < 1e-3);
    }

    #[test]
    fn s5_bm25_cat_both_zero() {
        let (analyzer, term_map, doc_map, mut reader, _dir) = s3_index();
        let params = Bm25Params { k1: 1.2, b: 0.75 };
        let results = retrieve_bm25("cat", &analyzer, &term_map, &doc_map, &mut reader, params, 10).unwrap();
        assert_eq!(results, vec![(0.0, "a.txt".to_string()), (0.0, "b.txt".to_string())]);
    }

    #[test]
    fn unknown_query_term_yields_empty_result() {
        let (analyzer, term_map, doc_map, mut reader, _dir) = s3_index();
        let results = retrieve_tfidf("zzzznotaword", &analyzer, &term_map, &doc_map, &mut reader, 10).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn empty_query_yields_empty_result() {
        let (analyzer, term_map, doc_map, mut reader, _dir) = s3_index();
        let results = retrieve_tfidf("   123 456  ", &analyzer, &term_map, &doc_map, &mut reader, 10).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn top_k_truncates() {
        let (analyzer, term_map, doc_map, mut reader, _dir) = s3_index();
        let results = retrieve_tfidf("cat", &analyzer, &term_map, &doc_map, &mut reader, 1).unwrap();
        assert_eq!(results, vec![(0.0, "a.txt".to_string())]);
    }

    #[test]
    fn retriever_config_default_top_k_matches_spec() {
        let (analyzer, term_map, doc_map, mut reader, _dir) = s3_index();
        let config = crate::config::RetrieverConfig::default();
        let results =
            retrieve_tfidf("cat", &analyzer, &term_map, &doc_map, &mut reader, config.top_k).unwrap();
        assert_eq!(results.len(), 2);
    }
}
