use serde::{Deserialize, Serialize};
use std::fmt;

/// 行優先で格納された長方形の整数テーブル
///
/// 能力ベクトル・需要ベクトル・基地ごとの保有数など、シナリオ中の
/// 2次元の表はすべてこの型で保持します。全ての行は同じ列数を持ちます。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<i64>>", into = "Vec<Vec<i64>>")]
pub struct Table {
    rows: usize,
    cols: usize,
    data: Vec<i64>,
}

/// 行ごとの長さが揃っていない場合のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaggedRowError {
    pub row: usize,
    pub expected: usize,
    pub found: usize,
}

impl fmt::Display for RaggedRowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "行 {} の列数が不正です (期待値: {}, 実際: {})",
            self.row, self.expected, self.found
        )
    }
}

impl std::error::Error for RaggedRowError {}

impl Table {
    /// 行のリストからテーブルを作成
    ///
    /// 列数は先頭行から決まります。行が空の場合は 0×0 のテーブルになります。
    pub fn from_rows(rows: Vec<Vec<i64>>) -> Result<Self, RaggedRowError> {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        Self::with_cols(cols, rows)
    }

    /// 列数を明示してテーブルを作成（行が0でも列数を保持できる）
    pub fn with_cols(cols: usize, rows: Vec<Vec<i64>>) -> Result<Self, RaggedRowError> {
        let mut data = Vec::with_capacity(rows.len() * cols);
        let n_rows = rows.len();
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(RaggedRowError {
                    row: i,
                    expected: cols,
                    found: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self {
            rows: n_rows,
            cols,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// (行数, 列数)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn row(&self, index: usize) -> Option<&[i64]> {
        if index >= self.rows {
            return None;
        }
        let start = index * self.cols;
        Some(&self.data[start..start + self.cols])
    }

    pub fn get(&self, row: usize, col: usize) -> Option<i64> {
        if col >= self.cols {
            return None;
        }
        self.row(row).map(|r| r[col])
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[i64]> + '_ {
        (0..self.rows).filter_map(move |i| self.row(i))
    }

    /// 要素ごとの差 `self - other` を計算
    ///
    /// 形状が一致しない場合は `None` を返します。
    pub fn checked_sub(&self, other: &Table) -> Option<Table> {
        if self.shape() != other.shape() {
            return None;
        }
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a - b)
            .collect();
        Some(Table {
            rows: self.rows,
            cols: self.cols,
            data,
        })
    }

    /// 最小要素（空テーブルでは `None`）
    pub fn min_value(&self) -> Option<i64> {
        self.data.iter().copied().min()
    }
}

impl TryFrom<Vec<Vec<i64>>> for Table {
    type Error = RaggedRowError;

    fn try_from(rows: Vec<Vec<i64>>) -> Result<Self, Self::Error> {
        Table::from_rows(rows)
    }
}

impl From<Table> for Vec<Vec<i64>> {
    fn from(table: Table) -> Self {
        table.iter_rows().map(|r| r.to_vec()).collect()
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.iter_rows().enumerate() {
            let cells: Vec<String> = row.iter().map(|v| format!("{:>3}", v)).collect();
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "[{}]", cells.join(","))?;
        }
        Ok(())
    }
}
