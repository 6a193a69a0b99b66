//! # Knowledge モジュール
//!
//! シナリオのテーブルに対する検証と参照の窓口を提供します。
//!
//! [`Knowledge`] は期待する種別数（需要種別・搭載種別・目標種別）を保持し、
//! [`Knowledge::check`] でシナリオのテーブル形状がそれらと一致するかを検証します。
//! 検証後は各テーブルの全体、または1行を参照できます。
//!
//! ## 使用例
//!
//! ```rust
//! use allocsim::knowledge::Knowledge;
//! use allocsim::scenario::ScenarioConfig;
//!
//! let config = ScenarioConfig::builtin();
//! let knowledge = Knowledge::from_config(&config);
//! knowledge.check().unwrap();
//!
//! assert_eq!(knowledge.plane_type(3).unwrap(), 1);
//! assert_eq!(knowledge.agent_thres_row(0).unwrap(), vec![16, 16, 0, 0, 0]);
//! ```

use std::fmt;
use tracing::{debug, warn};

use crate::models::{Lookup, Selection, Table, TableKind};
use crate::scenario::ScenarioConfig;

/// シナリオ知識への参照
///
/// シナリオは借用するだけで変更しません。
#[derive(Debug, Clone, Copy)]
pub struct Knowledge<'a> {
    config: &'a ScenarioConfig,
    /// 能力ベクトル・需要ベクトルの次元
    pub num_requirement_type: usize,
    /// 搭載種別の数（実機種別ではない）
    pub num_plane_type: usize,
    pub num_target_type: usize,
}

impl<'a> Knowledge<'a> {
    pub fn new(
        config: &'a ScenarioConfig,
        num_requirement_type: usize,
        num_plane_type: usize,
        num_target_type: usize,
    ) -> Self {
        Self {
            config,
            num_requirement_type,
            num_plane_type,
            num_target_type,
        }
    }

    /// シナリオ自身の種別数で作成
    pub fn from_config(config: &'a ScenarioConfig) -> Self {
        Self::new(
            config,
            config.num_requirement_type,
            config.num_plane_type,
            config.num_target_type,
        )
    }

    pub fn config(&self) -> &'a ScenarioConfig {
        self.config
    }

    /// テーブル形状の検証
    ///
    /// 最初に見つかった不一致を [`KnowledgeError::Validation`] として返します。
    /// 実機保有数テーブルは閾値テーブルと同じ形状であることも検証します。
    pub fn check(&self) -> Result<(), KnowledgeError> {
        let config = self.config;

        // A. 能力ベクトル
        let (rows, cols) = config.plane_capacity.shape();
        self.check_dim("PLANE_CAPACITY", "列数", cols, self.num_requirement_type)?;
        self.check_dim("PLANE_CAPACITY", "行数", rows, self.num_plane_type)?;

        // B. 搭載種別 → 実機種別
        self.check_dim("REAL_PLANE", "長さ", config.real_plane.len(), self.num_plane_type)?;

        // C. 目標の需要ベクトル
        let (rows, cols) = config.target_requirement.shape();
        self.check_dim("TARGET_REQUIREMENT", "列数", cols, self.num_requirement_type)?;
        self.check_dim("TARGET_REQUIREMENT", "行数", rows, self.num_target_type)?;

        // D. 基地の搭載種別保有数
        self.check_dim("AGENT_PLANE", "列数", config.agent_plane.cols(), self.num_plane_type)?;

        // E. 呼び出し閾値
        if config.agent_thres.cols() == 0 {
            return Err(self.fail("AGENT_THRES", "列数が0です".to_string()));
        }

        // F. 実機保有数
        if config.agent_real_plane.shape() != config.agent_thres.shape() {
            return Err(self.fail(
                "AGENT_REAL_PLANE",
                format!(
                    "形状 {:?} が AGENT_THRES の形状 {:?} と一致しません",
                    config.agent_real_plane.shape(),
                    config.agent_thres.shape()
                ),
            ));
        }

        debug!(
            "シナリオ知識の検証完了 (需要種別: {}, 搭載種別: {}, 目標種別: {})",
            self.num_requirement_type, self.num_plane_type, self.num_target_type
        );
        Ok(())
    }

    fn check_dim(
        &self,
        table: &'static str,
        dimension: &str,
        actual: usize,
        expected: usize,
    ) -> Result<(), KnowledgeError> {
        if actual == expected {
            return Ok(());
        }
        Err(self.fail(
            table,
            format!("{}が {} です（期待値: {}）", dimension, actual, expected),
        ))
    }

    fn fail(&self, table: &'static str, message: String) -> KnowledgeError {
        warn!("{} の形式に問題があります: {}", table, message);
        KnowledgeError::Validation { table, message }
    }

    /// 搭載種別ごとの能力ベクトル（全体）
    pub fn plane_capacity(&self) -> &'a Table {
        &self.config.plane_capacity
    }

    pub fn plane_capacity_row(&self, index: usize) -> Result<&'a [i64], KnowledgeError> {
        table_row("PLANE_CAPACITY", &self.config.plane_capacity, index)
    }

    /// 搭載種別ごとの実機種別（全体）
    pub fn plane_types(&self) -> &'a [usize] {
        &self.config.real_plane
    }

    /// 搭載種別 `index` が属する実機種別
    pub fn plane_type(&self, index: usize) -> Result<usize, KnowledgeError> {
        self.config
            .real_plane
            .get(index)
            .copied()
            .ok_or(KnowledgeError::IndexOutOfRange {
                table: "REAL_PLANE",
                index,
                len: self.config.real_plane.len(),
            })
    }

    /// 目標種別ごとの需要ベクトル（全体）
    pub fn target_requirement(&self) -> &'a Table {
        &self.config.target_requirement
    }

    pub fn target_requirement_row(&self, index: usize) -> Result<&'a [i64], KnowledgeError> {
        table_row("TARGET_REQUIREMENT", &self.config.target_requirement, index)
    }

    /// 基地ごとの搭載種別保有数（全体）
    pub fn agent_plane(&self) -> &'a Table {
        &self.config.agent_plane
    }

    pub fn agent_plane_row(&self, index: usize) -> Result<&'a [i64], KnowledgeError> {
        table_row("AGENT_PLANE", &self.config.agent_plane, index)
    }

    /// 基地ごとの実機保有数から呼び出し閾値を引いた値（全体）
    ///
    /// 名前に反して閾値そのものではなく `AGENT_REAL_PLANE - AGENT_THRES` を返します。
    pub fn agent_thres(&self) -> Result<Table, KnowledgeError> {
        let real = &self.config.agent_real_plane;
        let thres = &self.config.agent_thres;
        real.checked_sub(thres)
            .ok_or_else(|| KnowledgeError::ShapeMismatch {
                left: "AGENT_REAL_PLANE",
                left_shape: real.shape(),
                right: "AGENT_THRES",
                right_shape: thres.shape(),
            })
    }

    /// 基地 `index` の `AGENT_REAL_PLANE[index] - AGENT_THRES[index]`
    pub fn agent_thres_row(&self, index: usize) -> Result<Vec<i64>, KnowledgeError> {
        let real = table_row("AGENT_REAL_PLANE", &self.config.agent_real_plane, index)?;
        let thres = table_row("AGENT_THRES", &self.config.agent_thres, index)?;
        if real.len() != thres.len() {
            return Err(KnowledgeError::ShapeMismatch {
                left: "AGENT_REAL_PLANE",
                left_shape: self.config.agent_real_plane.shape(),
                right: "AGENT_THRES",
                right_shape: self.config.agent_thres.shape(),
            });
        }
        Ok(real.iter().zip(thres).map(|(r, t)| r - t).collect())
    }

    /// 種類と範囲を指定してテーブルを参照
    pub fn lookup(&self, kind: TableKind, selection: Selection) -> Result<Lookup, KnowledgeError> {
        let result = match (kind, selection) {
            (TableKind::PlaneCapacity, Selection::All) => Lookup::Table(self.plane_capacity().clone()),
            (TableKind::PlaneCapacity, Selection::Row(i)) => {
                Lookup::Row(self.plane_capacity_row(i)?.to_vec())
            }
            (TableKind::PlaneType, Selection::All) => Lookup::Types(self.plane_types().to_vec()),
            (TableKind::PlaneType, Selection::Row(i)) => Lookup::Type(self.plane_type(i)?),
            (TableKind::TargetRequirement, Selection::All) => {
                Lookup::Table(self.target_requirement().clone())
            }
            (TableKind::TargetRequirement, Selection::Row(i)) => {
                Lookup::Row(self.target_requirement_row(i)?.to_vec())
            }
            (TableKind::AgentPlane, Selection::All) => Lookup::Table(self.agent_plane().clone()),
            (TableKind::AgentPlane, Selection::Row(i)) => {
                Lookup::Row(self.agent_plane_row(i)?.to_vec())
            }
            (TableKind::AgentThres, Selection::All) => Lookup::Table(self.agent_thres()?),
            (TableKind::AgentThres, Selection::Row(i)) => Lookup::Row(self.agent_thres_row(i)?),
        };
        Ok(result)
    }
}

fn table_row<'t>(
    name: &'static str,
    table: &'t Table,
    index: usize,
) -> Result<&'t [i64], KnowledgeError> {
    table.row(index).ok_or(KnowledgeError::IndexOutOfRange {
        table: name,
        index,
        len: table.rows(),
    })
}

/// シナリオ知識の検証・参照エラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KnowledgeError {
    /// テーブル形状が期待する種別数と一致しない
    Validation {
        table: &'static str,
        message: String,
    },
    /// 行番号がテーブルの範囲外
    IndexOutOfRange {
        table: &'static str,
        index: usize,
        len: usize,
    },
    /// 要素ごとの演算でテーブル形状が一致しない
    ShapeMismatch {
        left: &'static str,
        left_shape: (usize, usize),
        right: &'static str,
        right_shape: (usize, usize),
    },
}

impl KnowledgeError {
    /// エラーの原因となったテーブル名
    pub fn table(&self) -> &'static str {
        match self {
            KnowledgeError::Validation { table, .. } => table,
            KnowledgeError::IndexOutOfRange { table, .. } => table,
            KnowledgeError::ShapeMismatch { left, .. } => left,
        }
    }
}

impl fmt::Display for KnowledgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KnowledgeError::Validation { table, message } => {
                write!(f, "{} の形式に問題があります: {}", table, message)
            }
            KnowledgeError::IndexOutOfRange { table, index, len } => {
                write!(f, "{} の範囲外の参照です: index {} (長さ {})", table, index, len)
            }
            KnowledgeError::ShapeMismatch {
                left,
                left_shape,
                right,
                right_shape,
            } => write!(
                f,
                "{} {:?} と {} {:?} の形状が一致しません",
                left, left_shape, right, right_shape
            ),
        }
    }
}

impl std::error::Error for KnowledgeError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtin() -> ScenarioConfig {
        ScenarioConfig::builtin()
    }

    #[test]
    fn test_check_passes_with_scenario_counts() {
        let config = builtin();
        assert_eq!(Knowledge::from_config(&config).check(), Ok(()));
        assert_eq!(Knowledge::new(&config, 7, 12, 6).check(), Ok(()));
    }

    #[test]
    fn test_check_fails_on_wrong_plane_type() {
        let config = builtin();
        for wrong in [11, 13] {
            let err = Knowledge::new(&config, 7, wrong, 6).check().unwrap_err();
            assert_eq!(err.table(), "PLANE_CAPACITY");
            assert!(err.to_string().contains("PLANE_CAPACITY"));
        }
    }

    #[test]
    fn test_check_names_each_table() {
        let config = builtin();
        let err = Knowledge::new(&config, 8, 12, 6).check().unwrap_err();
        assert_eq!(err.table(), "PLANE_CAPACITY");

        let err = Knowledge::new(&config, 7, 12, 5).check().unwrap_err();
        assert_eq!(err.table(), "TARGET_REQUIREMENT");

        let mut config = builtin();
        config.real_plane.pop();
        let err = Knowledge::from_config(&config).check().unwrap_err();
        assert_eq!(err.table(), "REAL_PLANE");

        let mut config = builtin();
        config.agent_plane = Table::from_rows(vec![vec![0; 11]; 5]).unwrap();
        let err = Knowledge::from_config(&config).check().unwrap_err();
        assert_eq!(err.table(), "AGENT_PLANE");

        let mut config = builtin();
        config.agent_thres = Table::with_cols(0, vec![vec![]; 5]).unwrap();
        let err = Knowledge::from_config(&config).check().unwrap_err();
        assert_eq!(err.table(), "AGENT_THRES");
    }

    #[test]
    fn test_check_real_plane_shape() {
        let mut config = builtin();
        config.agent_real_plane = Table::from_rows(vec![vec![0; 4]; 5]).unwrap();
        let err = Knowledge::from_config(&config).check().unwrap_err();
        assert_eq!(err.table(), "AGENT_REAL_PLANE");
        assert!(matches!(err, KnowledgeError::Validation { .. }));
    }

    #[test]
    fn test_plane_capacity() {
        let config = builtin();
        let knowledge = Knowledge::from_config(&config);
        assert_eq!(knowledge.plane_capacity().shape(), (12, 7));
        assert_eq!(knowledge.plane_capacity_row(0).unwrap(), &[0, 4, 0, 0, 0, 0, 0]);
        assert_eq!(knowledge.plane_capacity_row(8).unwrap(), &[0, 0, 0, 0, 0, 6, 0]);
    }

    #[test]
    fn test_plane_type() {
        let config = builtin();
        let knowledge = Knowledge::from_config(&config);
        assert_eq!(knowledge.plane_type(3).unwrap(), 1);
        assert_eq!(knowledge.plane_type(11).unwrap(), 4);
        assert_eq!(knowledge.plane_types().len(), 12);
    }

    #[test]
    fn test_target_requirement() {
        let config = builtin();
        let knowledge = Knowledge::from_config(&config);
        assert_eq!(knowledge.target_requirement().shape(), (6, 7));
        assert_eq!(knowledge.target_requirement_row(2).unwrap(), &[0, 0, 0, 2, 0, 0, 2]);
    }

    #[test]
    fn test_agent_thres_is_headroom() {
        let config = builtin();
        let knowledge = Knowledge::from_config(&config);
        assert_eq!(knowledge.agent_thres_row(0).unwrap(), vec![16, 16, 0, 0, 0]);
        assert_eq!(knowledge.agent_thres_row(3).unwrap(), vec![6, 16, 12, 6, 0]);

        let all = knowledge.agent_thres().unwrap();
        assert_eq!(all.shape(), (5, 5));
        for i in 0..5 {
            assert_eq!(all.row(i).unwrap(), knowledge.agent_thres_row(i).unwrap().as_slice());
        }
    }

    #[test]
    fn test_agent_plane_unchanged_across_calls() {
        let config = builtin();
        let knowledge = Knowledge::from_config(&config);
        let first = knowledge.agent_plane().clone();
        let second = knowledge.agent_plane();
        assert_eq!(first.shape(), (5, 12));
        assert_eq!(&first, second);
        assert_eq!(second, &builtin().agent_plane);
    }

    #[test]
    fn test_repeated_lookup_is_identical() {
        let config = builtin();
        let knowledge = Knowledge::from_config(&config);
        for kind in TableKind::ALL {
            for selection in [Selection::All, Selection::Row(1)] {
                let a = knowledge.lookup(kind, selection).unwrap();
                let b = knowledge.lookup(kind, selection).unwrap();
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn test_lookup_matches_getters() {
        let config = builtin();
        let knowledge = Knowledge::from_config(&config);
        assert_eq!(
            knowledge.lookup(TableKind::PlaneType, Selection::Row(3)),
            Ok(Lookup::Type(1))
        );
        assert_eq!(
            knowledge.lookup(TableKind::TargetRequirement, Selection::Row(2)),
            Ok(Lookup::Row(vec![0, 0, 0, 2, 0, 0, 2]))
        );
        assert_eq!(
            knowledge.lookup(TableKind::AgentThres, Selection::from(Some(0))),
            Ok(Lookup::Row(vec![16, 16, 0, 0, 0]))
        );
        assert_eq!(
            knowledge.lookup(TableKind::AgentPlane, Selection::from(None)),
            Ok(Lookup::Table(builtin().agent_plane))
        );
    }

    #[test]
    fn test_index_out_of_range() {
        let config = builtin();
        let knowledge = Knowledge::from_config(&config);
        assert_eq!(
            knowledge.plane_capacity_row(12),
            Err(KnowledgeError::IndexOutOfRange { table: "PLANE_CAPACITY", index: 12, len: 12 })
        );
        assert!(knowledge.plane_type(12).is_err());
        assert!(knowledge.target_requirement_row(6).is_err());
        assert!(knowledge.agent_plane_row(5).is_err());
        let err = knowledge.agent_thres_row(5).unwrap_err();
        assert_eq!(err.table(), "AGENT_REAL_PLANE");
    }

    #[test]
    fn test_agent_thres_shape_mismatch() {
        let mut config = builtin();
        config.agent_real_plane = Table::from_rows(vec![vec![1; 4]; 5]).unwrap();
        let knowledge = Knowledge::from_config(&config);
        assert!(matches!(
            knowledge.agent_thres(),
            Err(KnowledgeError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            knowledge.agent_thres_row(0),
            Err(KnowledgeError::ShapeMismatch { .. })
        ));
    }
}
