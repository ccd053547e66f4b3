//! External k-way merge of per-block intermediate indexes into one.
//!
//! Grounded on `IndexMergeIterator` (kev1N916/keSE `index_merge_iterator.rs`):
//! each reader offers its current `(termID, D, TF)` triple, a min-heap picks
//! the globally smallest termID across readers, and ties on termID are summed
//! via [`crate::accumulate::sorted_merge`] before the accumulator is flushed.
//! `bsbi.py::merge` is the same algorithm (`heapq.merge` over per-block
//! generators, `sorted_merge_posts_and_tfs` on ties) run one layer up; this
//! merges a set of block readers directly rather than re-merging pairwise.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::accumulate::sorted_merge;
use crate::error::IndexError;
use crate::index_file::{IndexReader, IndexWriter};

/// Merge `readers` (each already positioned at its start) into `writer` in
/// ascending termID order, summing term frequencies for any termID common to
/// more than one reader. `readers`' own term order must each be strictly
/// increasing; a violation of the combined ordering invariant surfaces as
/// [`IndexError::MergeOrderViolation`].
pub fn merge_into(mut readers: Vec<IndexReader>, writer: &mut IndexWriter) -> Result<(), IndexError> {
    log::debug!("merging {} intermediate indexes", readers.len());
    let mut current: Vec<Option<(u32, Vec<u32>, Vec<u32>)>> = Vec::with_capacity(readers.len());
    for r in readers.iter_mut() {
        current.push(r.iterate_next()?);
    }

    let mut heap: BinaryHeap<Reverse<(u32, usize)>> = BinaryHeap::new();
    for (i, item) in current.iter().enumerate() {
        if let Some((term, _, _)) = item {
            heap.push(Reverse((*term, i)));
        }
    }

    let mut acc: Option<(u32, Vec<u32>, Vec<u32>)> = None;

    while let Some(Reverse((term, idx))) = heap.pop() {
        let (popped_term, doc_ids, tfs) = current[idx].take().expect("heap entry without current item");
        debug_assert_eq!(popped_term, term);

        let next = readers[idx].iterate_next()?;
        if let Some((next_term, _, _)) = &next {
            heap.push(Reverse((*next_term, idx)));
        }
        current[idx] = next;

        acc = Some(match acc.take() {
            None => (term, doc_ids, tfs),
            Some((cur_term, cur_doc, cur_tf)) => {
                if term == cur_term {
                    let (merged_doc, merged_tf) = sorted_merge(&cur_doc, &cur_tf, &doc_ids, &tfs);
                    (cur_term, merged_doc, merged_tf)
                } else if term > cur_term {
                    writer.append(cur_term, &cur_doc, &cur_tf)?;
                    (term, doc_ids, tfs)
                } else {
                    return Err(IndexError::MergeOrderViolation {
                        current: cur_term,
                        got: term,
                    });
                }
            }
        });
    }

    if let Some((term, doc_ids, tfs)) = acc {
        writer.append(term, &doc_ids, &tfs)?;
    }

    log::debug!("merge complete");
    Ok(())
}
