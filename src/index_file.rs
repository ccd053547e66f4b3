//! On-disk representation of one index: a `.index` data file (concatenated
//! encoded postings/tf) plus a `.dict` metadata sidecar (postings directory,
//! term order, doc lengths).
//!
//! The `.dict` format is a hand-rolled, length-prefixed binary schema with an
//! explicit magic and version byte, replacing the original's pickled
//! metadata with the same framing idiom used elsewhere in this crate for
//! on-disk sidecars (`b"ROAR"`/`b"TURB"`-style magic + `u32` version +
//! manual `to_le_bytes`/`from_le_bytes`, no serde).

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::codec::PostingsEncoding;
use crate::error::IndexError;

const DICT_MAGIC: &[u8; 4] = b"BSB1";
const DICT_VERSION: u8 = 1;

/// Postings directory entry for one term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub offset: u64,
    pub df: u32,
    pub len_postings_bytes: u32,
    pub len_tf_bytes: u32,
}

fn index_path(dir: &Path, base_name: &str) -> PathBuf {
    dir.join(format!("{base_name}.index"))
}

fn dict_path(dir: &Path, base_name: &str) -> PathBuf {
    dir.join(format!("{base_name}.dict"))
}

// ---------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------

/// Append-only writer for one `.index`/`.dict` pair.
pub struct IndexWriter {
    data: BufWriter<File>,
    offset: u64,
    directory: FxHashMap<u32, DirectoryEntry>,
    terms: Vec<u32>,
    doc_length: FxHashMap<u32, u32>,
    encoding: PostingsEncoding,
    dict_path: PathBuf,
}

impl IndexWriter {
    pub fn create(
        dir: &Path,
        base_name: &str,
        encoding: PostingsEncoding,
    ) -> Result<Self, IndexError> {
        std::fs::create_dir_all(dir)?;
        let file = File::create(index_path(dir, base_name))?;
        Ok(Self {
            data: BufWriter::new(file),
            offset: 0,
            directory: FxHashMap::default(),
            terms: Vec::new(),
            doc_length: FxHashMap::default(),
            encoding,
            dict_path: dict_path(dir, base_name),
        })
    }

    /// Append one term's postings. `doc_ids` must be strictly increasing and
    /// non-empty, with a parallel positive-tf list of the same length.
    /// Fails with [`IndexError::DuplicateTermAppend`] if `term_id` was
    /// already written by this writer.
    pub fn append(
        &mut self,
        term_id: u32,
        doc_ids: &[u32],
        tfs: &[u32],
    ) -> Result<(), IndexError> {
        if self.directory.contains_key(&term_id) {
            return Err(IndexError::DuplicateTermAppend(term_id));
        }
        if doc_ids.is_empty() || doc_ids.len() != tfs.len() {
            return Err(IndexError::IndexIntegrity(format!(
                "append(termID={term_id}): doc_ids and tfs must be equal-length and non-empty"
            )));
        }
        for w in doc_ids.windows(2) {
            if w[1] <= w[0] {
                return Err(IndexError::IndexIntegrity(format!(
                    "append(termID={term_id}): doc_ids must be strictly increasing"
                )));
            }
        }
        if tfs.iter().any(|&tf| tf == 0) {
            return Err(IndexError::IndexIntegrity(format!(
                "append(termID={term_id}): all term frequencies must be positive"
            )));
        }

        let postings_bytes = self.encoding.encode_postings(doc_ids)?;
        let tf_bytes = self.encoding.encode_tf(tfs)?;

        let offset_before = self.offset;
        self.data.write_all(&postings_bytes)?;
        self.data.write_all(&tf_bytes)?;
        self.offset += (postings_bytes.len() + tf_bytes.len()) as u64;

        self.directory.insert(
            term_id,
            DirectoryEntry {
                offset: offset_before,
                df: doc_ids.len() as u32,
                len_postings_bytes: postings_bytes.len() as u32,
                len_tf_bytes: tf_bytes.len() as u32,
            },
        );
        self.terms.push(term_id);

        for (&doc_id, &tf) in doc_ids.iter().zip(tfs.iter()) {
            *self.doc_length.entry(doc_id).or_insert(0) += tf;
        }

        Ok(())
    }

    /// Flush the data file and atomically write the `.dict` sidecar.
    pub fn close(mut self) -> Result<(), IndexError> {
        self.data.flush()?;

        let tmp_path = self.dict_path.with_extension("dict.tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut w = BufWriter::new(file);
            w.write_all(DICT_MAGIC)?;
            w.write_all(&[DICT_VERSION])?;

            w.write_all(&(self.terms.len() as u32).to_le_bytes())?;
            for term_id in &self.terms {
                let entry = self.directory[term_id];
                w.write_all(&term_id.to_le_bytes())?;
                w.write_all(&entry.offset.to_le_bytes())?;
                w.write_all(&entry.df.to_le_bytes())?;
                w.write_all(&entry.len_postings_bytes.to_le_bytes())?;
                w.write_all(&entry.len_tf_bytes.to_le_bytes())?;
            }

            w.write_all(&(self.doc_length.len() as u32).to_le_bytes())?;
            for (&doc_id, &len) in &self.doc_length {
                w.write_all(&doc_id.to_le_bytes())?;
                w.write_all(&len.to_le_bytes())?;
            }
            w.flush()?;
        }
        std::fs::rename(&tmp_path, &self.dict_path)?;

        Ok(())
    }
}

// ---------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------

/// Random-access + streaming reader for one `.index`/`.dict` pair.
pub struct IndexReader {
    data: File,
    directory: FxHashMap<u32, DirectoryEntry>,
    terms: Vec<u32>,
    doc_length: HashMap<u32, u32>,
    encoding: PostingsEncoding,
    iter_pos: usize,
}

impl IndexReader {
    pub fn open(
        dir: &Path,
        base_name: &str,
        encoding: PostingsEncoding,
    ) -> Result<Self, IndexError> {
        let dict_file = File::open(dict_path(dir, base_name)).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                IndexError::IndexIntegrity(format!(
                    "missing .dict sidecar for index '{base_name}'"
                ))
            } else {
                IndexError::Io(e)
            }
        })?;
        let mut r = BufReader::new(dict_file);

        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if &magic != DICT_MAGIC {
            return Err(IndexError::IndexIntegrity(
                "bad .dict magic".to_string(),
            ));
        }
        let mut version = [0u8; 1];
        r.read_exact(&mut version)?;
        if version[0] != DICT_VERSION {
            return Err(IndexError::IndexIntegrity(format!(
                "unsupported .dict version {}",
                version[0]
            )));
        }

        let term_count = read_u32(&mut r)?;
        let mut directory = FxHashMap::default();
        let mut terms = Vec::with_capacity(term_count as usize);
        for _ in 0..term_count {
            let term_id = read_u32(&mut r)?;
            let offset = read_u64(&mut r)?;
            let df = read_u32(&mut r)?;
            let len_postings_bytes = read_u32(&mut r)?;
            let len_tf_bytes = read_u32(&mut r)?;
            directory.insert(
                term_id,
                DirectoryEntry {
                    offset,
                    df,
                    len_postings_bytes,
                    len_tf_bytes,
                },
            );
            terms.push(term_id);
        }

        let doc_length_count = read_u32(&mut r)?;
        let mut doc_length = HashMap::with_capacity(doc_length_count as usize);
        for _ in 0..doc_length_count {
            let doc_id = read_u32(&mut r)?;
            let len = read_u32(&mut r)?;
            doc_length.insert(doc_id, len);
        }

        let data = File::open(index_path(dir, base_name))?;

        Ok(Self {
            data,
            directory,
            terms,
            doc_length,
            encoding,
            iter_pos: 0,
        })
    }

    pub fn doc_length(&self) -> &HashMap<u32, u32> {
        &self.doc_length
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn directory_entry(&self, term_id: u32) -> Option<&DirectoryEntry> {
        self.directory.get(&term_id)
    }

    /// Seek to `directory[term_id]` and decode its postings + tf lists.
    /// O(1) seek, O(df) decode.
    pub fn get(&mut self, term_id: u32) -> Result<(Vec<u32>, Vec<u32>), IndexError> {
        let entry = *self
            .directory
            .get(&term_id)
            .ok_or(IndexError::IndexIntegrity(format!(
                "unknown termID {term_id}"
            )))?;

        self.data.seek(SeekFrom::Start(entry.offset))?;
        let mut postings_buf = vec![0u8; entry.len_postings_bytes as usize];
        self.data.read_exact(&mut postings_buf)?;
        let mut tf_buf = vec![0u8; entry.len_tf_bytes as usize];
        self.data.read_exact(&mut tf_buf)?;

        let doc_ids = self.encoding.decode_postings(&postings_buf)?;
        let tfs = self.encoding.decode_tf(&tf_buf)?;

        if doc_ids.len() as u32 != entry.df {
            return Err(IndexError::IndexIntegrity(format!(
                "termID {term_id}: directory df={} but decoded {} doc ids",
                entry.df,
                doc_ids.len()
            )));
        }
        if tfs.len() != doc_ids.len() {
            return Err(IndexError::IndexIntegrity(format!(
                "termID {term_id}: postings/tf length mismatch"
            )));
        }

        Ok((doc_ids, tfs))
    }

    /// Reposition the streaming iterator to the start (for re-iteration).
    pub fn reset(&mut self) {
        self.iter_pos = 0;
    }

    /// Yield the next `(termID, D, TF)` triple in insertion order, streaming
    /// one term's postings/tf at a time. Returns `None` once exhausted.
    pub fn iterate_next(&mut self) -> Result<Option<(u32, Vec<u32>, Vec<u32>)>, IndexError> {
        if self.iter_pos >= self.terms.len() {
            return Ok(None);
        }
        let term_id = self.terms[self.iter_pos];
        self.iter_pos += 1;
        let (doc_ids, tfs) = self.get(term_id)?;
        Ok(Some((term_id, doc_ids, tfs)))
    }
}

fn read_u32<R: Read>(r: &mut R) -> Result<u32, IndexError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64<R: Read>(r: &mut R) -> Result<u64, IndexError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}
