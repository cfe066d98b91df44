// ページ番号とファイル識別子
pub mod entity;
// buffer pool から見た page store の契約
pub mod manager;

// ヒープファイルを使った storagemanager の具体的な実装
pub mod disk;
// オンメモリの storagemanager の具体的な実装
pub mod memory;
