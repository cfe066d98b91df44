use std::collections::BTreeSet;
use std::fs::{File, OpenOptions};
use std::io::{self, prelude::*, Result, SeekFrom};
use std::path::Path;

use super::entity::{PageId, PAGE_SIZE};
use super::manager::StorageManager;

pub struct DiskManager {
    // ヒープファイルのファイルディスクリプタ
    heap_file: File,
    // 採番するページを決めるカウンタ
    next_page_id: u64,
    // 解放済みで再利用を待つページ
    free_pages: BTreeSet<PageId>,
}

impl DiskManager {
    pub fn new(heap_file: File) -> Result<Self> {
        let heap_file_size = heap_file.metadata()?.len();
        let next_page_id = heap_file_size / PAGE_SIZE as u64;
        Ok(Self {
            heap_file,
            next_page_id,
            free_pages: BTreeSet::new(),
        })
    }

    pub fn open(heap_file_path: impl AsRef<Path>) -> Result<Self> {
        let heap_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(heap_file_path)?;
        Self::new(heap_file)
    }

    /// Number of page slots in the heap file, disposed ones included.
    pub fn num_pages(&self) -> u64 {
        self.next_page_id
    }

    fn check_page_id(&self, page_id: PageId) -> Result<()> {
        if page_id.to_u64() >= self.next_page_id || self.free_pages.contains(&page_id) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("page {} is not allocated", page_id),
            ));
        }
        Ok(())
    }

    fn check_len(len: usize) -> Result<()> {
        if len != PAGE_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("page buffer must be {} bytes, got {}", PAGE_SIZE, len),
            ));
        }
        Ok(())
    }

    fn write_at(&mut self, page_id: PageId, data: &[u8]) -> Result<()> {
        // オフセットを計算
        let offset = PAGE_SIZE as u64 * page_id.to_u64();
        // ページ先頭へシーク
        self.heap_file.seek(SeekFrom::Start(offset))?;
        // データを書きこむ
        self.heap_file.write_all(data)
    }
}

impl StorageManager for DiskManager {
    fn allocate_page(&mut self) -> Result<PageId> {
        let page_id = match self.free_pages.iter().next().copied() {
            Some(page_id) => page_id,
            None => PageId(self.next_page_id),
        };
        // 採番したページはゼロで埋めておき、すぐに読み出せるようにする
        self.write_at(page_id, &[0u8; PAGE_SIZE])?;
        if !self.free_pages.remove(&page_id) {
            self.next_page_id += 1;
        }
        Ok(page_id)
    }
    fn read_page_data(&mut self, page_id: PageId, data: &mut [u8]) -> Result<()> {
        self.check_page_id(page_id)?;
        Self::check_len(data.len())?;
        let offset = PAGE_SIZE as u64 * page_id.to_u64();
        self.heap_file.seek(SeekFrom::Start(offset))?;
        // データを読み出す
        self.heap_file.read_exact(data)
    }
    fn write_page_data(&mut self, page_id: PageId, data: &[u8]) -> Result<()> {
        self.check_page_id(page_id)?;
        Self::check_len(data.len())?;
        self.write_at(page_id, data)
    }
    fn dispose_page(&mut self, page_id: PageId) -> Result<()> {
        self.check_page_id(page_id)?;
        self.free_pages.insert(page_id);
        Ok(())
    }
    fn sync(&mut self) -> Result<()> {
        self.heap_file.flush()?;
        self.heap_file.sync_all()
    }
}
