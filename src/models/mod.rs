// 長方形テーブル
pub mod table;

// 参照指定・参照結果などの共通型
pub mod common;

// 便利な re-export
pub use common::{Lookup, Selection, TableKind};
pub use table::{RaggedRowError, Table};
