//! Bidirectional string<->integer dictionary.
//!
//! Owned per-instance: no shared mutable defaults across `IdMap` values (the
//! classic Python-default-argument hazard this crate is explicitly ported
//! away from).

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use rustc_hash::FxHashMap;

use crate::error::IndexError;

const IDMAP_VERSION: u8 = 1;

/// Maps strings to dense, monotonically-assigned non-negative integer ids and
/// back. Mutated only by the indexer; immutable once indexing completes.
#[derive(Debug, Clone, Default)]
pub struct IdMap {
    str_to_id: FxHashMap<String, u32>,
    id_to_str: Vec<String>,
}

impl IdMap {
    pub fn new() -> Self {
        Self {
            str_to_id: FxHashMap::default(),
            id_to_str: Vec::new(),
        }
    }

    /// Look up the id for `s`, assigning a new one in first-seen order if absent.
    pub fn get_or_assign(&mut self, s: &str) -> u32 {
        if let Some(&id) = self.str_to_id.get(s) {
            return id;
        }
        let id = self.id_to_str.len() as u32;
        self.id_to_str.push(s.to_string());
        self.str_to_id.insert(s.to_string(), id);
        id
    }

    /// Look up the id for `s` without assigning a new one.
    pub fn id_of(&self, s: &str) -> Option<u32> {
        self.str_to_id.get(s).copied()
    }

    /// Look up the string for `id`. Never allocates a new id.
    pub fn str_of(&self, id: u32) -> Option<&str> {
        self.id_to_str.get(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.id_to_str.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_str.is_empty()
    }

    /// Iterate `(id, string)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.id_to_str
            .iter()
            .enumerate()
            .map(|(i, s)| (i as u32, s.as_str()))
    }

    /// Persist to `path` in id order. Ids are reconstructed positionally on
    /// load, so entries must never be written out of order. `magic`
    /// distinguishes a term-map sidecar from a doc-map sidecar so loading
    /// the wrong file is rejected immediately rather than silently
    /// misinterpreted.
    pub fn save(&self, path: &Path, magic: &[u8; 4]) -> Result<(), IndexError> {
        let file = File::create(path)?;
        let mut w = BufWriter::new(file);
        w.write_all(magic)?;
        w.write_all(&[IDMAP_VERSION])?;
        w.write_all(&(self.id_to_str.len() as u32).to_le_bytes())?;
        for s in &self.id_to_str {
            let bytes = s.as_bytes();
            w.write_all(&(bytes.len() as u32).to_le_bytes())?;
            w.write_all(bytes)?;
        }
        w.flush()?;
        Ok(())
    }

    pub fn load(path: &Path, expected_magic: &[u8; 4]) -> Result<Self, IndexError> {
        let file = File::open(path)?;
        let mut r = BufReader::new(file);

        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if &magic != expected_magic {
            return Err(IndexError::IndexIntegrity("bad id-map magic".to_string()));
        }
        let mut version = [0u8; 1];
        r.read_exact(&mut version)?;
        if version[0] != IDMAP_VERSION {
            return Err(IndexError::IndexIntegrity(format!(
                "unsupported id-map version {}",
                version[0]
            )));
        }

        let mut count_buf = [0u8; 4];
        r.read_exact(&mut count_buf)?;
        let count = u32::from_le_bytes(count_buf);

        let mut map = Self::new();
        for _ in 0..count {
            let mut len_buf = [0u8; 4];
            r.read_exact(&mut len_buf)?;
            let len = u32::from_le_bytes(len_buf) as usize;
            let mut bytes = vec![0u8; len];
            r.read_exact(&mut bytes)?;
            let s = String::from_utf8(bytes)
                .map_err(|e| IndexError::IndexIntegrity(format!("id-map entry is not utf8: {e}")))?;
            map.get_or_assign(&s);
        }
        Ok(map)
    }
}
