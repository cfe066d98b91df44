use super::entity::{Page, PageHandle};
use super::stats::BufferStats;
use crate::storage::entity::{FileId, PageId};

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("no free buffer available in buffer pool")]
    NoFreeBuffer,
    #[error("page {page_id} of file {file} is not in the buffer pool")]
    PageNotManaged { file: FileId, page_id: PageId },
    #[error("page {page_id} of file {file} is not pinned")]
    PageNotPinned { file: FileId, page_id: PageId },
    #[error("page {page_id} of file {file} is pinned")]
    PagePinned { file: FileId, page_id: PageId },
    #[error("frame {frame} still refers to file {file} but holds no page")]
    BadBuffer { file: FileId, frame: usize },
    #[error("buffer pool is inconsistent: {0}")]
    InconsistentState(String),
    #[error("file {0} is not registered with the buffer pool")]
    UnknownFile(FileId),
    #[error("page handle for page {page_id} of file {file} is stale")]
    StaleHandle { file: FileId, page_id: PageId },
}

pub trait BufferPoolManager {
    // ページを取得して pin する
    fn fetch_page(&mut self, file: FileId, page_id: PageId) -> Result<PageHandle, Error>;
    // pin を外す。is_dirty なら書き戻し対象にする
    fn unpin_page(&mut self, file: FileId, page_id: PageId, is_dirty: bool) -> Result<(), Error>;
    // 新たにページを生成して pin する
    fn create_page(&mut self, file: FileId) -> Result<PageHandle, Error>;
    // ページを破棄する
    fn dispose_page(&mut self, file: FileId, page_id: PageId) -> Result<(), Error>;
    // ファイルのページをすべて書き出して追い出す
    fn flush_file(&mut self, file: FileId) -> Result<(), Error>;
    // 汚れたページをすべてストレージに書き出す
    fn flush_all(&mut self) -> Result<(), Error>;

    fn page(&self, handle: &PageHandle) -> Result<&Page, Error>;
    fn page_mut(&mut self, handle: &PageHandle) -> Result<&mut Page, Error>;

    fn stats(&self) -> BufferStats;
}
