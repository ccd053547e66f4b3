//! Pure sorted-merge of parallel `(docID, value)` lists.
//!
//! Used both by the external merger (summing term frequencies for equal
//! docIDs across intermediate indexes) and by the retriever (summing partial
//! scores for equal docIDs across query terms). A pure function rather than
//! the original's `.sort()`-mutating `sorted_merge_posts_and_tfs` (spec.md
//! §9 design note: the port must not mutate its inputs).

/// Merge two doc-id-sorted `(doc_id, value)` lists into one, strictly
/// increasing by doc_id, summing values when a doc_id appears in both.
/// Associative: the order in which a set of lists is pairwise-merged does
/// not affect the final result.
pub fn sorted_merge<T: Copy + std::ops::Add<Output = T>>(
    a_docs: &[u32],
    a_vals: &[T],
    b_docs: &[u32],
    b_vals: &[T],
) -> (Vec<u32>, Vec<T>) {
    let mut out_docs = Vec::with_capacity(a_docs.len() + b_docs.len());
    let mut out_vals = Vec::with_capacity(a_docs.len() + b_docs.len());

    let mut i = 0;
    let mut j = 0;
    while i < a_docs.len() && j < b_docs.len() {
        match a_docs[i].cmp(&b_docs[j]) {
            std::cmp::Ordering::Less => {
                out_docs.push(a_docs[i]);
                out_vals.push(a_vals[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                out_docs.push(b_docs[j]);
                out_vals.push(b_vals[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                out_docs.push(a_docs[i]);
                out_vals.push(a_vals[i] + b_vals[j]);
                i += 1;
                j += 1;
            }
        }
    }
    out_docs.extend_from_slice(&a_docs[i..]);
    out_vals.extend_from_slice(&a_vals[i..]);
    out_docs.extend_from_slice(&b_docs[j..]);
    out_vals.extend_from_slice(&b_vals[j..]);

    (out_docs, out_vals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s2_merge_example() {
        // L1 = [(1,34),(3,2),(4,23)], L2 = [(1,11),(2,4),(4,3),(6,13)]
        let (docs, tfs) = sorted_merge(&[1, 3, 4], &[34u32, 2, 23], &[1, 2, 4, 6], &[11, 4, 3, 13]);
        assert_eq!(docs, vec![1, 2, 3, 4, 6]);
        assert_eq!(tfs, vec![45, 4, 2, 26, 13]);
    }

    #[test]
    fn pure_does_not_mutate_inputs() {
        let a_docs = [1u32, 5];
        let a_vals = [1u32, 1];
        let b_docs = [2u32, 5];
        let b_vals = [1u32, 1];
        let _ = sorted_merge(&a_docs, &a_vals, &b_docs, &b_vals);
        assert_eq!(a_docs, [1, 5]);
        assert_eq!(b_docs, [2, 5]);
    }

    #[test]
    fn associative_regardless_of_pairing_order() {
        let lists: Vec<(Vec<u32>, Vec<u32>)> = vec![
            (vec![1, 4], vec![1, 1]),
            (vec![2, 4], vec![1, 1]),
            (vec![3, 4], vec![1, 1]),
        ];

        // ((L1 + L2) + L3)
        let (d12, v12) = sorted_merge(&lists[0].0, &lists[0].1, &lists[1].0, &lists[1].1);
        let left = sorted_merge(&d12, &v12, &lists[2].0, &lists[2].1);

        // (L1 + (L2 + L3))
        let (d23, v23) = sorted_merge(&lists[1].0, &lists[1].1, &lists[2].0, &lists[2].1);
        let right = sorted_merge(&lists[0].0, &lists[0].1, &d23, &v23);

        assert_eq!(left, right);
    }

    #[test]
    fn disjoint_lists_concatenate_in_order() {
        let (docs, vals) = sorted_merge(&[1, 2], &[10u32, 20], &[3, 4], &[30, 40]);
        assert_eq!(docs, vec![1, 2, 3, 4]);
        assert_eq!(vals, vec![10, 20, 30, 40]);
    }
}
