//! # Scenario モジュール
//!
//! 基地（エージェント）と目標の割り当てシミュレーションで使用する
//! 静的なシナリオ知識を定義します。
//!
//! シナリオはスカラーパラメータ（エージェント数、エピソード長、種別数、報酬定数）と
//! 6つの固定テーブルから構成されます。組み込みシナリオは
//! [`ScenarioConfig::builtin`] で取得でき、同じ形式のYAMLファイルからも読み込めます。
//!
//! | テーブル | 形状 | 内容 |
//! |---|---|---|
//! | `plane_capacity` | 搭載種別 × 需要種別 | 搭載種別ごとに供給できる能力 |
//! | `real_plane` | 搭載種別 | 搭載種別が属する実機種別 |
//! | `target_requirement` | 目標種別 × 需要種別 | 目標種別ごとの需要 |
//! | `agent_plane` | 基地 × 搭載種別 | 基地ごとの搭載種別保有数 |
//! | `agent_thres` | 基地 × 実機種別 | 基地ごとの呼び出し閾値 |
//! | `agent_real_plane` | 基地 × 実機種別 | 基地ごとの実機保有数 |
//!
//! 読み込み後のシナリオは不変として扱い、参照で各コンポーネントに渡します。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::models::Table;

/// 完全なシナリオ設定
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScenarioConfig {
    pub num_agents: usize,
    pub max_episode_step: u32,
    pub num_requirement_type: usize,
    /// 搭載種別の数（実機種別ではない）
    pub num_plane_type: usize,
    /// 1回の出撃で使用できる最大機数
    pub max_num_plane: u32,
    pub num_target_type: usize,

    /// 搭載種別ごとのコスト
    pub plane_cost: Vec<f64>,
    /// 目標1つ達成ごとの報酬
    pub single_target_reward: f64,
    /// エピソード終了時の報酬
    pub total_reward: f64,

    pub plane_capacity: Table,
    pub real_plane: Vec<usize>,
    pub target_requirement: Table,
    pub agent_plane: Table,
    pub agent_thres: Table,
    pub agent_real_plane: Table,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ScenarioConfig {
    /// 組み込みシナリオ（基地5、搭載種別12、目標種別6）
    pub fn builtin() -> Self {
        let num_plane_type = 12;

        Self {
            num_agents: 5,
            max_episode_step: 500,
            num_requirement_type: 7,
            num_plane_type,
            max_num_plane: 4,
            num_target_type: 6,

            plane_cost: vec![0.2; num_plane_type],
            single_target_reward: 1.0,
            total_reward: 500.0,

            plane_capacity: builtin_table(vec![
                vec![0, 4, 0, 0, 0, 0, 0],
                vec![4, 0, 0, 0, 0, 0, 0],
                vec![0, 0, 2, 0, 0, 0, 0],
                vec![0, 0, 0, 0, 2, 0, 0],
                vec![0, 0, 0, 4, 0, 0, 0],
                vec![0, 0, 0, 0, 0, 4, 0],
                vec![0, 0, 0, 0, 2, 0, 0],
                vec![0, 0, 0, 2, 0, 0, 0],
                vec![0, 0, 0, 0, 0, 6, 0],
                vec![0, 0, 0, 0, 0, 0, 4],
                vec![0, 0, 0, 4, 0, 0, 0],
                vec![0, 0, 0, 0, 0, 0, 2],
            ]),
            // 実機種別 0: 搭載0-2, 1: 搭載3-5, 2: 搭載6-9, 3: 搭載10, 4: 搭載11
            real_plane: vec![0, 0, 0, 1, 1, 1, 2, 2, 2, 2, 3, 4],
            target_requirement: builtin_table(vec![
                vec![4, 4, 0, 0, 0, 0, 0],
                vec![0, 0, 2, 0, 0, 0, 0],
                vec![0, 0, 0, 2, 0, 0, 2],
                vec![0, 0, 0, 4, 6, 0, 0],
                vec![0, 0, 0, 0, 0, 6, 2],
                vec![0, 0, 0, 4, 0, 4, 0],
            ]),
            agent_plane: builtin_table(vec![
                vec![36, 36, 36, 36, 36, 36, 0, 0, 0, 0, 0, 0],
                vec![0, 0, 0, 36, 36, 36, 0, 0, 0, 0, 0, 24],
                vec![0, 0, 0, 36, 36, 36, 48, 48, 48, 48, 0, 36],
                vec![24, 24, 24, 36, 36, 36, 48, 48, 48, 48, 24, 0],
                vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 24, 24],
            ]),
            agent_thres: builtin_table(vec![
                vec![20, 20, 0, 0, 0],
                vec![0, 20, 0, 0, 18],
                vec![0, 20, 36, 0, 20],
                vec![18, 20, 36, 18, 0],
                vec![0, 0, 0, 18, 18],
            ]),
            agent_real_plane: builtin_table(vec![
                vec![36, 36, 0, 0, 0],
                vec![0, 36, 0, 0, 24],
                vec![0, 36, 48, 0, 36],
                vec![24, 36, 48, 24, 0],
                vec![0, 0, 0, 24, 24],
            ]),
        }
    }

    /// YAMLファイルからシナリオ設定を読み込み
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| ScenarioError::IoError(path.to_path_buf(), e))?;

        let config: ScenarioConfig = serde_yaml::from_str(&contents)
            .map_err(|e| ScenarioError::ParseError(path.to_path_buf(), e))?;

        config.validate()?;
        debug!("シナリオ読み込み: {}", path.display());

        Ok(config)
    }

    /// YAML文字列からシナリオ設定を読み込み
    pub fn from_yaml_str(contents: &str) -> Result<Self, ScenarioError> {
        let config: ScenarioConfig = serde_yaml::from_str(contents)
            .map_err(|e| ScenarioError::ParseError(Path::new("<string>").to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// 実機種別の数（`agent_thres` の列数）
    pub fn num_plane_type_real(&self) -> usize {
        self.agent_thres.cols()
    }

    /// 設定の基本的な検証
    ///
    /// スカラー値と値域に関する検証です。テーブルの形状が期待する種別数と
    /// 一致するかどうかは [`crate::knowledge::Knowledge::check`] で検証します。
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let positive = [
            ("num_agents", self.num_agents),
            ("max_episode_step", self.max_episode_step as usize),
            ("num_requirement_type", self.num_requirement_type),
            ("num_plane_type", self.num_plane_type),
            ("max_num_plane", self.max_num_plane as usize),
            ("num_target_type", self.num_target_type),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(ScenarioError::ValidationError(format!(
                    "{} must be positive",
                    name
                )));
            }
        }

        if self.plane_cost.len() != self.num_plane_type {
            return Err(ScenarioError::ValidationError(format!(
                "plane_cost has {} entries, expected {}",
                self.plane_cost.len(),
                self.num_plane_type
            )));
        }

        let tables = [
            ("plane_capacity", &self.plane_capacity),
            ("target_requirement", &self.target_requirement),
            ("agent_plane", &self.agent_plane),
            ("agent_thres", &self.agent_thres),
            ("agent_real_plane", &self.agent_real_plane),
        ];
        for (name, table) in tables {
            if let Some(min) = table.min_value() {
                if min < 0 {
                    return Err(ScenarioError::ValidationError(format!(
                        "{} contains negative value {}",
                        name, min
                    )));
                }
            }
        }

        for (name, table) in [
            ("agent_plane", &self.agent_plane),
            ("agent_thres", &self.agent_thres),
            ("agent_real_plane", &self.agent_real_plane),
        ] {
            if table.rows() != self.num_agents {
                return Err(ScenarioError::ValidationError(format!(
                    "{} has {} rows, expected num_agents = {}",
                    name,
                    table.rows(),
                    self.num_agents
                )));
            }
        }

        let num_real = self.num_plane_type_real();
        if let Some((i, t)) = self.real_plane.iter().enumerate().find(|(_, t)| **t >= num_real) {
            return Err(ScenarioError::ValidationError(format!(
                "real_plane[{}] = {} is outside 0..{}",
                i, t, num_real
            )));
        }

        Ok(())
    }

    /// シナリオの概要を表示
    pub fn print_summary(&self) {
        println!("=== シナリオ情報 ===");
        println!("基地数: {}", self.num_agents);
        println!("最大ステップ数: {}", self.max_episode_step);
        println!("1回の最大出撃機数: {}", self.max_num_plane);
        println!();

        println!("=== 種別 ===");
        println!("需要種別: {}", self.num_requirement_type);
        println!("搭載種別: {}", self.num_plane_type);
        println!("実機種別: {}", self.num_plane_type_real());
        println!("目標種別: {}", self.num_target_type);
        println!();

        println!("=== 報酬 ===");
        let total_cost: f64 = self.plane_cost.iter().sum();
        println!("搭載種別コスト合計: {:.2}", total_cost);
        println!("目標達成報酬: {:.1}", self.single_target_reward);
        println!("エピソード報酬: {:.1}", self.total_reward);
        println!();

        println!("=== 基地戦力 ===");
        for (i, row) in self.agent_real_plane.iter_rows().enumerate() {
            let total: i64 = row.iter().sum();
            println!("  基地{}: 実機 {}機 {:?}", i, total, row);
        }
    }
}

fn builtin_table(rows: Vec<Vec<i64>>) -> Table {
    // 組み込みテーブルは全て長方形
    Table::from_rows(rows).unwrap_or_else(|e| panic!("組み込みテーブルが不正です: {}", e))
}

/// シナリオ読み込みエラー
#[derive(Debug)]
pub enum ScenarioError {
    FileNotFound(std::path::PathBuf),
    IoError(std::path::PathBuf, std::io::Error),
    ParseError(std::path::PathBuf, serde_yaml::Error),
    ValidationError(String),
}

impl std::fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioError::FileNotFound(path) => {
                write!(f, "シナリオファイルが見つかりません: {}", path.display())
            }
            ScenarioError::IoError(path, err) => {
                write!(f, "ファイル読み込みエラー {}: {}", path.display(), err)
            }
            ScenarioError::ParseError(path, err) => {
                write!(f, "YAML解析エラー {}: {}", path.display(), err)
            }
            ScenarioError::ValidationError(msg) => {
                write!(f, "設定検証エラー: {}", msg)
            }
        }
    }
}

impl std::error::Error for ScenarioError {}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO_FILE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/scenarios/basic_airbase.yaml");

    #[test]
    fn test_builtin_is_valid() {
        let config = ScenarioConfig::builtin();
        assert!(config.validate().is_ok());
        assert_eq!(config.num_plane_type_real(), 5);
        assert_eq!(config.plane_capacity.shape(), (12, 7));
        assert_eq!(config.agent_plane.shape(), (5, 12));
        assert_eq!(config.plane_cost.len(), 12);
    }

    #[test]
    fn test_scenario_file_matches_builtin() {
        let loaded = ScenarioConfig::from_file(SCENARIO_FILE).unwrap();
        assert_eq!(loaded, ScenarioConfig::builtin());
    }

    #[test]
    fn test_yaml_round_trip() {
        let yaml = serde_yaml::to_string(&ScenarioConfig::builtin()).unwrap();
        let parsed = ScenarioConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed, ScenarioConfig::builtin());
    }

    #[test]
    fn test_missing_file() {
        let err = ScenarioConfig::from_file("scenarios/does_not_exist.yaml").unwrap_err();
        assert!(matches!(err, ScenarioError::FileNotFound(_)));
    }

    #[test]
    fn test_ragged_table_rejected() {
        let mut yaml = serde_yaml::to_value(ScenarioConfig::builtin()).unwrap();
        yaml["agent_thres"] = serde_yaml::from_str("[[20, 20, 0, 0, 0], [0, 20]]").unwrap();
        let text = serde_yaml::to_string(&yaml).unwrap();
        let err = ScenarioConfig::from_yaml_str(&text).unwrap_err();
        assert!(matches!(err, ScenarioError::ParseError(_, _)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ScenarioConfig::builtin();
        config.real_plane[11] = 5;
        assert!(matches!(config.validate(), Err(ScenarioError::ValidationError(_))));

        let mut config = ScenarioConfig::builtin();
        config.plane_cost.pop();
        assert!(config.validate().is_err());

        let mut config = ScenarioConfig::builtin();
        config.num_agents = 4;
        let msg = config.validate().unwrap_err().to_string();
        assert!(msg.contains("agent_plane"));

        let mut config = ScenarioConfig::builtin();
        config.agent_thres = Table::from_rows(vec![vec![-1, 0, 0, 0, 0]; 5]).unwrap();
        let msg = config.validate().unwrap_err().to_string();
        assert!(msg.contains("agent_thres"));
    }
}
