use std::collections::BTreeSet;
use std::io::{self, Read, Result, Write};

use zerocopy::AsBytes;

use super::entity::{PageId, PAGE_SIZE};
use super::manager::StorageManager;

#[derive(Default)]
pub struct MemoryManager {
    heap: Vec<[u8; PAGE_SIZE]>,
    free_pages: BTreeSet<PageId>,
}

impl MemoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, page_id: PageId) -> Result<&mut [u8; PAGE_SIZE]> {
        if self.free_pages.contains(&page_id) {
            return Err(not_allocated(page_id));
        }
        self.heap
            .get_mut(page_id.to_u64() as usize)
            .ok_or_else(|| not_allocated(page_id))
    }
}

fn not_allocated(page_id: PageId) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("page {} is not allocated", page_id),
    )
}

impl StorageManager for MemoryManager {
    fn allocate_page(&mut self) -> Result<PageId> {
        if let Some(page_id) = self.free_pages.iter().next().copied() {
            self.free_pages.remove(&page_id);
            self.heap[page_id.to_u64() as usize] = [0; PAGE_SIZE];
            return Ok(page_id);
        }
        self.heap.push([0; PAGE_SIZE]);
        Ok(PageId(self.heap.len() as u64 - 1))
    }
    fn read_page_data(&mut self, page_id: PageId, data: &mut [u8]) -> Result<()> {
        let slot = self.slot(page_id)?;
        let mut row: &[u8] = slot.as_bytes();
        row.read_exact(data)
    }
    fn write_page_data(&mut self, page_id: PageId, data: &[u8]) -> Result<()> {
        let buf: &[u8] = data.as_bytes();
        let slot = self.slot(page_id)?;
        let mut row: &mut [u8] = slot.as_bytes_mut();
        row.write_all(buf)
    }
    fn dispose_page(&mut self, page_id: PageId) -> Result<()> {
        self.slot(page_id)?;
        self.free_pages.insert(page_id);
        Ok(())
    }
    fn sync(&mut self) -> Result<()> {
        Ok(())
    }
}
