//! # allocsim
//!
//! 基地と目標の割り当てシミュレーションのための静的なシナリオ知識。
//!
//! - [`scenario`]: シナリオ設定（組み込みテーブルとYAML読み込み）
//! - [`knowledge`]: テーブル形状の検証と参照
//! - [`models`]: テーブル型と参照指定
//! - [`logging`]: ログ出力の初期化

pub mod knowledge;
pub mod logging;
pub mod models;
pub mod scenario;

pub use knowledge::{Knowledge, KnowledgeError};
pub use models::{Lookup, Selection, Table, TableKind};
pub use scenario::{ScenarioConfig, ScenarioError};
