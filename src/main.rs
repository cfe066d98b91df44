use anyhow::Result;

use clockbuf::buffer::{clocksweep::ClockSweepManager, manager::BufferPoolManager};
use clockbuf::storage::disk::DiskManager;

const DEFAULT_HEAP_FILE: &str = "sample-db.cbf";
const DEFAULT_POOL_SIZE: usize = 10;
const NUM_PAGES: usize = 25;

fn main() -> Result<()> {
    // config
    let mut args = std::env::args().skip(1);
    let heap_file_path = args.next().unwrap_or_else(|| DEFAULT_HEAP_FILE.to_string());
    let pool_size = match args.next() {
        Some(size) => size.parse()?,
        None => DEFAULT_POOL_SIZE,
    };

    let disk = DiskManager::open(&heap_file_path)?;
    let mut bufmgr = ClockSweepManager::new(pool_size);
    let file = bufmgr.open_file(disk);

    // プールより多くのページを書き込み、追い出しを起こす
    let mut page_ids = Vec::with_capacity(NUM_PAGES);
    for i in 0..NUM_PAGES {
        let handle = bufmgr.create_page(file)?;
        let greeting = format!("page #{} says hello", i);
        bufmgr.page_mut(&handle)?[..greeting.len()].copy_from_slice(greeting.as_bytes());
        bufmgr.unpin_page(file, handle.page_id, true)?;
        page_ids.push(handle.page_id);
    }

    for &page_id in page_ids.iter().step_by(5) {
        let handle = bufmgr.fetch_page(file, page_id)?;
        let page = bufmgr.page(&handle)?;
        let end = page.iter().position(|&b| b == 0).unwrap_or(page.len());
        println!("{}: {}", page_id, String::from_utf8_lossy(&page[..end]));
        bufmgr.unpin_page(file, page_id, false)?;
    }

    println!("{}", bufmgr);

    // 破棄したページ番号は次の採番で再利用される
    bufmgr.dispose_page(file, page_ids[0])?;
    let handle = bufmgr.create_page(file)?;
    println!("reallocated page {}", handle.page_id);
    bufmgr.unpin_page(file, handle.page_id, false)?;

    let disk = bufmgr.close_file(file)?;
    println!("{} pages in {}", disk.num_pages(), heap_file_path);
    Ok(())
}
