use std::collections::hash_map::{Entry, HashMap};

use super::entity::FrameId;
use super::manager::Error;
use crate::storage::entity::{FileId, PageId};

/// Index of resident pages: `(file, page) -> frame`.
#[derive(Debug)]
pub struct PageTable {
    entries: HashMap<(FileId, PageId), FrameId>,
}

impl PageTable {
    pub fn new(pool_size: usize) -> Self {
        // 元のハッシュ表と同じく、フレーム数の 1.2 倍 + 1 を確保する
        let capacity = pool_size * 6 / 5 + 1;
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    pub fn lookup(&self, file: FileId, page_id: PageId) -> Option<FrameId> {
        self.entries.get(&(file, page_id)).copied()
    }

    pub fn insert(&mut self, file: FileId, page_id: PageId, frame_id: FrameId) -> Result<(), Error> {
        match self.entries.entry((file, page_id)) {
            Entry::Occupied(e) => Err(Error::InconsistentState(format!(
                "page {} of file {} already mapped to frame {}",
                page_id,
                file,
                e.get()
            ))),
            Entry::Vacant(e) => {
                e.insert(frame_id);
                Ok(())
            }
        }
    }

    pub fn remove(&mut self, file: FileId, page_id: PageId) -> Result<FrameId, Error> {
        self.entries.remove(&(file, page_id)).ok_or_else(|| {
            Error::InconsistentState(format!(
                "page {} of file {} missing from page table",
                page_id, file
            ))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FileId, PageId, FrameId)> + '_ {
        self.entries
            .iter()
            .map(|(&(file, page_id), &frame_id)| (file, page_id, frame_id))
    }
}
