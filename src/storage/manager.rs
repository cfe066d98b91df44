use super::entity::PageId;

use std::io::Result;

pub trait StorageManager {
    // 新しいページIDを採番する
    fn allocate_page(&mut self) -> Result<PageId>;
    // ページのデータを読み出す
    fn read_page_data(&mut self, page_id: PageId, data: &mut [u8]) -> Result<()>;
    // データをページに書き出す
    fn write_page_data(&mut self, page_id: PageId, data: &[u8]) -> Result<()>;
    // ページを解放し、以後の採番で再利用できるようにする
    fn dispose_page(&mut self, page_id: PageId) -> Result<()>;
    // 同期処理
    fn sync(&mut self) -> Result<()>;
}

impl<S: StorageManager + ?Sized> StorageManager for Box<S> {
    fn allocate_page(&mut self) -> Result<PageId> {
        (**self).allocate_page()
    }
    fn read_page_data(&mut self, page_id: PageId, data: &mut [u8]) -> Result<()> {
        (**self).read_page_data(page_id, data)
    }
    fn write_page_data(&mut self, page_id: PageId, data: &[u8]) -> Result<()> {
        (**self).write_page_data(page_id, data)
    }
    fn dispose_page(&mut self, page_id: PageId) -> Result<()> {
        (**self).dispose_page(page_id)
    }
    fn sync(&mut self) -> Result<()> {
        (**self).sync()
    }
}
