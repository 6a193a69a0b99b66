use std::fmt;
use std::str::FromStr;

use crate::models::table::Table;

/// 参照範囲の指定
///
/// `All` はテーブル全体、`Row(i)` は i 行目（1次元の表では i 番目の要素）を表します。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    All,
    Row(usize),
}

impl From<Option<usize>> for Selection {
    fn from(index: Option<usize>) -> Self {
        match index {
            Some(i) => Selection::Row(i),
            None => Selection::All,
        }
    }
}

impl From<usize> for Selection {
    fn from(index: usize) -> Self {
        Selection::Row(index)
    }
}

/// 参照可能なテーブルの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// 搭載種別ごとの能力ベクトル
    PlaneCapacity,
    /// 搭載種別 → 実機種別
    PlaneType,
    /// 目標種別ごとの需要ベクトル
    TargetRequirement,
    /// 基地ごとの搭載種別保有数
    AgentPlane,
    /// 基地ごとの実機保有数 − 呼び出し閾値
    AgentThres,
}

impl TableKind {
    pub const ALL: [TableKind; 5] = [
        TableKind::PlaneCapacity,
        TableKind::PlaneType,
        TableKind::TargetRequirement,
        TableKind::AgentPlane,
        TableKind::AgentThres,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TableKind::PlaneCapacity => "plane_capacity",
            TableKind::PlaneType => "plane_type",
            TableKind::TargetRequirement => "target_requirement",
            TableKind::AgentPlane => "agent_plane",
            TableKind::AgentThres => "agent_thres",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TableKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.to_lowercase().replace('-', "_");
        TableKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == key)
            .ok_or_else(|| {
                let names: Vec<&str> = TableKind::ALL.iter().map(|k| k.name()).collect();
                format!("無効なテーブル名: {}. 利用可能: {}", s, names.join(", "))
            })
    }
}

/// 参照結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Table(Table),
    Row(Vec<i64>),
    Types(Vec<usize>),
    Type(usize),
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::Table(table) => write!(f, "{}", table),
            Lookup::Row(row) => write!(f, "{:?}", row),
            Lookup::Types(types) => write!(f, "{:?}", types),
            Lookup::Type(t) => write!(f, "{}", t),
        }
    }
}
