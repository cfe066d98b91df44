use std::fmt;
use std::ops::{Index, IndexMut};

use log::{debug, error, trace, warn};

use crate::buffer::{
    entity::{FrameId, Page, PageHandle},
    frame::Frame,
    manager::*,
    page_table::PageTable,
    stats::BufferStats,
};
use crate::storage::{
    entity::{FileId, PageId, PAGE_SIZE},
    manager::StorageManager,
};

struct BufferPool {
    frames: Vec<Frame>,
    pages: Vec<Page>,
    clock_hand: FrameId,
}

impl Index<FrameId> for BufferPool {
    type Output = Frame;
    fn index(&self, index: FrameId) -> &Self::Output {
        &self.frames[index.0]
    }
}

impl IndexMut<FrameId> for BufferPool {
    fn index_mut(&mut self, index: FrameId) -> &mut Self::Output {
        &mut self.frames[index.0]
    }
}

impl BufferPool {
    fn new(pool_size: usize) -> Self {
        assert!(pool_size > 0, "buffer pool needs at least one frame");
        let frames = (0..pool_size).map(|i| Frame::new(FrameId(i))).collect();
        let pages = vec![[0u8; PAGE_SIZE]; pool_size];
        // 最初の advance でフレーム 0 を指すようにする
        let clock_hand = FrameId(pool_size - 1);
        Self {
            frames,
            pages,
            clock_hand,
        }
    }

    fn size(&self) -> usize {
        self.frames.len()
    }

    fn advance_clock(&mut self) -> FrameId {
        self.clock_hand = FrameId((self.clock_hand.0 + 1) % self.size());
        self.clock_hand
    }

    fn handle(&self, file: FileId, page_id: PageId, frame_id: FrameId) -> PageHandle {
        PageHandle {
            file,
            page_id,
            frame_id,
            generation: self[frame_id].generation,
        }
    }
}

fn store_of<S>(files: &mut [Option<S>], file: FileId) -> Result<&mut S, Error> {
    files
        .get_mut(file.0 as usize)
        .and_then(Option::as_mut)
        .ok_or(Error::UnknownFile(file))
}

/// Buffer pool with second-chance (clock) replacement.
///
/// Page stores are registered with `open_file` and addressed by the
/// returned `FileId` afterwards. Every page obtained from `fetch_page` or
/// `create_page` is pinned once and must be released with `unpin_page`.
///
/// Dropping the pool writes back dirty pages on a best-effort basis and
/// only logs failures; call `flush_all` or `close_file` first to observe
/// write errors.
pub struct ClockSweepManager<S: StorageManager> {
    files: Vec<Option<S>>,
    pool: BufferPool,
    page_table: PageTable,
    stats: BufferStats,
}

impl<S: StorageManager> ClockSweepManager<S> {
    pub fn new(pool_size: usize) -> Self {
        let pool = BufferPool::new(pool_size);
        let page_table = PageTable::new(pool_size);
        Self {
            files: vec![],
            pool,
            page_table,
            stats: BufferStats::default(),
        }
    }

    pub fn pool_size(&self) -> usize {
        self.pool.size()
    }

    // FileId は再利用しない
    pub fn open_file(&mut self, store: S) -> FileId {
        let file = FileId(self.files.len() as u32);
        self.files.push(Some(store));
        debug!("opened file {}", file);
        file
    }

    /// Flushes `file` and hands its store back to the caller.
    ///
    /// If the flush fails the store stays registered.
    pub fn close_file(&mut self, file: FileId) -> Result<S, Error> {
        self.flush_file(file)?;
        let store = self
            .files
            .get_mut(file.0 as usize)
            .and_then(Option::take)
            .ok_or(Error::UnknownFile(file))?;
        debug!("closed file {}", file);
        Ok(store)
    }

    pub fn file_mut(&mut self, file: FileId) -> Result<&mut S, Error> {
        store_of(&mut self.files, file)
    }

    pub fn frames(&self) -> &[Frame] {
        &self.pool.frames
    }

    pub fn reset_stats(&mut self) {
        self.stats.clear();
    }

    /// Checks that valid frames and page table entries correspond one to one.
    pub fn check_consistency(&self) -> Result<(), Error> {
        for (file, page_id, frame_id) in self.page_table.iter() {
            let holds = self
                .pool
                .frames
                .get(frame_id.0)
                .map_or(false, |frame| frame.holds(file, page_id));
            if !holds {
                return Err(Error::InconsistentState(format!(
                    "page {} of file {} mapped to frame {} which does not hold it",
                    page_id, file, frame_id
                )));
            }
        }
        let num_valid = self.pool.frames.iter().filter(|f| f.is_valid).count();
        if num_valid != self.page_table.len() {
            return Err(Error::InconsistentState(format!(
                "{} valid frames but {} page table entries",
                num_valid,
                self.page_table.len()
            )));
        }
        if let Some(frame) = self
            .pool
            .frames
            .iter()
            .find(|f| !f.is_valid && (f.is_pinned() || f.is_dirty || f.ref_bit))
        {
            return Err(Error::InconsistentState(format!(
                "empty frame {} is pinned, dirty or referenced",
                frame.frame_id
            )));
        }
        Ok(())
    }

    fn write_back(&mut self, frame_id: FrameId) -> Result<(), Error> {
        let frame = &self.pool[frame_id];
        let page_id = frame.page_id;
        let file = frame.file.ok_or_else(|| {
            Error::InconsistentState(format!("valid frame {} has no file", frame_id))
        })?;
        let store = store_of(&mut self.files, file)?;
        store.write_page_data(page_id, &self.pool.pages[frame_id.0])?;
        self.stats.disk_writes += 1;
        self.pool[frame_id].is_dirty = false;
        debug!(
            "wrote page {} of file {} from frame {}",
            page_id, file, frame_id
        );
        Ok(())
    }

    // Clock-sweep
    fn allocate_frame(&mut self) -> Result<FrameId, Error> {
        // 1 周目で参照ビットを落とし、2 周目で追い出せるようにする
        let max_advances = self.pool.size() * 2;
        for _ in 0..max_advances {
            let frame_id = self.pool.advance_clock();
            let frame = &mut self.pool[frame_id];
            if !frame.is_valid {
                return Ok(frame_id);
            }
            if frame.ref_bit {
                frame.ref_bit = false;
                continue;
            }
            if frame.is_pinned() {
                continue;
            }
            let page_id = frame.page_id;
            let is_dirty = frame.is_dirty;
            if is_dirty {
                self.write_back(frame_id)?;
            }
            let file = self.pool[frame_id].file.ok_or_else(|| {
                Error::InconsistentState(format!("valid frame {} has no file", frame_id))
            })?;
            self.page_table.remove(file, page_id)?;
            self.pool[frame_id].clear();
            trace!(
                "evicted page {} of file {} from frame {}",
                page_id,
                file,
                frame_id
            );
            return Ok(frame_id);
        }
        debug!("all {} frames are pinned", self.pool.size());
        Err(Error::NoFreeBuffer)
    }

    fn check_handle(&self, handle: &PageHandle) -> Result<(), Error> {
        let live = self.pool.frames.get(handle.frame_id.0).map_or(false, |frame| {
            frame.generation == handle.generation
                && frame.holds(handle.file, handle.page_id)
                && frame.is_pinned()
        });
        if live {
            Ok(())
        } else {
            Err(Error::StaleHandle {
                file: handle.file,
                page_id: handle.page_id,
            })
        }
    }
}

impl<S: StorageManager> BufferPoolManager for ClockSweepManager<S> {
    fn fetch_page(&mut self, file: FileId, page_id: PageId) -> Result<PageHandle, Error> {
        self.stats.accesses += 1;
        store_of(&mut self.files, file)?;
        if let Some(frame_id) = self.page_table.lookup(file, page_id) {
            let frame = &mut self.pool[frame_id];
            frame.ref_bit = true;
            frame.pin_count += 1;
            trace!(
                "hit page {} of file {} in frame {} (pin count {})",
                page_id,
                file,
                frame_id,
                frame.pin_count
            );
            return Ok(self.pool.handle(file, page_id, frame_id));
        }
        let frame_id = self.allocate_frame()?;
        let store = store_of(&mut self.files, file)?;
        store.read_page_data(page_id, &mut self.pool.pages[frame_id.0])?;
        self.stats.disk_reads += 1;
        self.page_table.insert(file, page_id, frame_id)?;
        self.pool[frame_id].set(file, page_id);
        trace!(
            "read page {} of file {} into frame {}",
            page_id,
            file,
            frame_id
        );
        Ok(self.pool.handle(file, page_id, frame_id))
    }

    fn unpin_page(&mut self, file: FileId, page_id: PageId, is_dirty: bool) -> Result<(), Error> {
        let frame_id = self
            .page_table
            .lookup(file, page_id)
            .ok_or(Error::PageNotManaged { file, page_id })?;
        let frame = &mut self.pool[frame_id];
        if !frame.is_pinned() {
            warn!("unpin of page {} of file {} with pin count 0", page_id, file);
            return Err(Error::PageNotPinned { file, page_id });
        }
        frame.pin_count -= 1;
        // dirty は書き戻しが成功するまで落とさない
        if is_dirty {
            frame.is_dirty = true;
        }
        Ok(())
    }

    fn create_page(&mut self, file: FileId) -> Result<PageHandle, Error> {
        let store = store_of(&mut self.files, file)?;
        let page_id = store.allocate_page()?;
        let frame_id = match self.allocate_frame() {
            Ok(frame_id) => frame_id,
            Err(e) => {
                // 採番済みのページはストレージ側に残る
                warn!(
                    "page {} of file {} allocated but no frame is available: {}",
                    page_id, file, e
                );
                return Err(e);
            }
        };
        self.pool.pages[frame_id.0] = [0u8; PAGE_SIZE];
        self.page_table.insert(file, page_id, frame_id)?;
        self.pool[frame_id].set(file, page_id);
        trace!(
            "allocated page {} of file {} in frame {}",
            page_id,
            file,
            frame_id
        );
        Ok(self.pool.handle(file, page_id, frame_id))
    }

    fn dispose_page(&mut self, file: FileId, page_id: PageId) -> Result<(), Error> {
        store_of(&mut self.files, file)?;
        if let Some(frame_id) = self.page_table.lookup(file, page_id) {
            if self.pool[frame_id].is_pinned() {
                return Err(Error::PagePinned { file, page_id });
            }
            // 破棄するページなので dirty でも書き戻さない
            self.page_table.remove(file, page_id)?;
            self.pool[frame_id].clear();
        }
        store_of(&mut self.files, file)?.dispose_page(page_id)?;
        debug!("disposed page {} of file {}", page_id, file);
        Ok(())
    }

    fn flush_file(&mut self, file: FileId) -> Result<(), Error> {
        store_of(&mut self.files, file)?;
        // 先に全フレームを検査し、pin されたページがあれば何も変更しない
        for frame in self.pool.frames.iter().filter(|f| f.file == Some(file)) {
            if !frame.is_valid {
                return Err(Error::BadBuffer {
                    file,
                    frame: frame.frame_id.0,
                });
            }
            if frame.is_pinned() {
                return Err(Error::PagePinned {
                    file,
                    page_id: frame.page_id,
                });
            }
        }
        for i in 0..self.pool.size() {
            let frame_id = FrameId(i);
            let frame = &self.pool[frame_id];
            if !frame.holds(file, frame.page_id) {
                continue;
            }
            let page_id = frame.page_id;
            if frame.is_dirty {
                self.write_back(frame_id)?;
            }
            self.page_table.remove(file, page_id)?;
            self.pool[frame_id].clear();
        }
        store_of(&mut self.files, file)?.sync()?;
        debug!("flushed file {}", file);
        Ok(())
    }

    fn flush_all(&mut self) -> Result<(), Error> {
        for i in 0..self.pool.size() {
            let frame_id = FrameId(i);
            let frame = &self.pool[frame_id];
            if frame.is_valid && frame.is_dirty {
                self.write_back(frame_id)?;
            }
        }
        for store in self.files.iter_mut().flatten() {
            store.sync()?;
        }
        Ok(())
    }

    fn page(&self, handle: &PageHandle) -> Result<&Page, Error> {
        self.check_handle(handle)?;
        Ok(&self.pool.pages[handle.frame_id.0])
    }

    fn page_mut(&mut self, handle: &PageHandle) -> Result<&mut Page, Error> {
        self.check_handle(handle)?;
        Ok(&mut self.pool.pages[handle.frame_id.0])
    }

    fn stats(&self) -> BufferStats {
        self.stats
    }
}

impl<S: StorageManager> Drop for ClockSweepManager<S> {
    fn drop(&mut self) {
        for i in 0..self.pool.size() {
            let frame_id = FrameId(i);
            let frame = &self.pool[frame_id];
            if !(frame.is_valid && frame.is_dirty) {
                continue;
            }
            let page_id = frame.page_id;
            if let Err(e) = self.write_back(frame_id) {
                error!(
                    "failed to write back page {} from frame {} on teardown: {}",
                    page_id, frame_id, e
                );
            }
        }
        for store in self.files.iter_mut().flatten() {
            if let Err(e) = store.sync() {
                error!("failed to sync file on teardown: {}", e);
            }
        }
    }
}

// ページ先頭の表示可能な部分だけを出す
fn printable(page: &Page) -> String {
    const MAX_PREVIEW: usize = 32;
    let end = page[..MAX_PREVIEW]
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(MAX_PREVIEW);
    page[..end]
        .iter()
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '.'
            }
        })
        .collect()
}

impl<S: StorageManager> fmt::Display for ClockSweepManager<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Print buffer...")?;
        for (frame, page) in self.pool.frames.iter().zip(self.pool.pages.iter()) {
            write!(
                f,
                "{}\t{}\tpinCnt: {}",
                frame.frame_id,
                printable(page),
                frame.pin_count
            )?;
            if frame.is_valid {
                write!(f, "\tvalid")?;
            }
            if frame.is_dirty {
                write!(f, "\tdirty")?;
            }
            writeln!(f)?;
        }
        write!(f, "{}", self.stats)
    }
}
