use crate::storage::entity::{FileId, PageId, PAGE_SIZE};

pub type Page = [u8; PAGE_SIZE];

#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub usize);

impl std::fmt::Display for FrameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A pinned page as handed out by the pool.
///
/// The handle is only a ticket: the bytes live in the pool and are reached
/// through `BufferPoolManager::page` / `page_mut`, which reject the handle
/// once its frame has been reset or is no longer pinned.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct PageHandle {
    pub file: FileId,
    pub page_id: PageId,
    pub(crate) frame_id: FrameId,
    pub(crate) generation: u64,
}

impl PageHandle {
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }
}
