use super::entity::FrameId;
use crate::storage::entity::{FileId, PageId};

/// Per-frame bookkeeping of the pool.
///
/// `is_valid` holds exactly when the page table maps `(file, page_id)` to
/// this frame. An invalid frame is never pinned, dirty or referenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub frame_id: FrameId,
    pub file: Option<FileId>,
    pub page_id: PageId,
    pub pin_count: u64,
    pub is_dirty: bool,
    pub is_valid: bool,
    pub ref_bit: bool,
    // clear() のたびに進む。古い PageHandle の検出に使う
    pub generation: u64,
}

impl Frame {
    pub fn new(frame_id: FrameId) -> Self {
        Self {
            frame_id,
            file: None,
            page_id: PageId::INVALID_PAGE_ID,
            pin_count: 0,
            is_dirty: false,
            is_valid: false,
            ref_bit: false,
            generation: 0,
        }
    }

    // 読み込み直後 / 採番直後の状態にする
    pub fn set(&mut self, file: FileId, page_id: PageId) {
        self.file = Some(file);
        self.page_id = page_id;
        self.pin_count = 1;
        self.is_dirty = false;
        self.is_valid = true;
        self.ref_bit = true;
    }

    pub fn clear(&mut self) {
        self.file = None;
        self.page_id = PageId::INVALID_PAGE_ID;
        self.pin_count = 0;
        self.is_dirty = false;
        self.is_valid = false;
        self.ref_bit = false;
        self.generation += 1;
    }

    pub fn is_pinned(&self) -> bool {
        self.pin_count > 0
    }

    pub fn holds(&self, file: FileId, page_id: PageId) -> bool {
        self.is_valid && self.file == Some(file) && self.page_id == page_id
    }
}
