// ページ画像とハンドル
pub mod entity;
// フレーム記述子
pub mod frame;
// buffer pool manager の契約とエラー
pub mod manager;
// (file, page) -> frame の索引
pub mod page_table;
// アクセス統計
pub mod stats;

// Clock-sweep を使った buffer pool による buffermanager の具体的な実装
pub mod clocksweep;
