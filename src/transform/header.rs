//! Header Interpreter Module
//!
//! ヘッダー行（1行目）の各セルから列の役割を決定する。

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::types::{CellCoord, SheetRow};

/// ファイル名列を示すヘッダー文字列（大文字小文字を区別、トリムなし）
pub const FILENAME_HEADER: &str = "filename";

/// メタデータ列のヘッダーパターン `^(\d+)\s+(.*)$`
///
/// PCRE互換: `\d`と`\s`はASCIIのみ、`.`は改行にマッチせず、
/// `$`は末尾の改行1つの直前にもマッチする。
static METADATA_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A([0-9]+)(?-u:\s)+(.*)\n?\z").expect("metadata header pattern is valid")
});

/// ヘッダー行の範囲外の列の役割
static IGNORED: ColumnRole = ColumnRole::Ignored;

/// 列の役割
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRole {
    /// セルの値がアセットのファイル名になる
    Filename,

    /// セルの値が`<field ref=".." title="..">`になる
    Metadata {
        /// ヘッダーの先頭の数字列
        ref_id: String,
        /// 数字列と空白に続く残りの文字列
        title: String,
    },

    /// 値を出力しない
    Ignored,
}

impl ColumnRole {
    /// ヘッダーセルの文字列から役割を決定する
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use sheetasset::ColumnRole;
    ///
    /// assert_eq!(ColumnRole::classify("filename"), ColumnRole::Filename);
    /// assert_eq!(
    ///     ColumnRole::classify("2 Ref Tag"),
    ///     ColumnRole::Metadata { ref_id: "2".to_string(), title: "Ref Tag".to_string() }
    /// );
    /// assert_eq!(ColumnRole::classify("notes"), ColumnRole::Ignored);
    /// ```
    pub fn classify(header: &str) -> Self {
        if header == FILENAME_HEADER {
            return ColumnRole::Filename;
        }

        match METADATA_HEADER.captures(header) {
            Some(caps) => ColumnRole::Metadata {
                ref_id: caps[1].to_string(),
                title: caps[2].to_string(),
            },
            None => ColumnRole::Ignored,
        }
    }
}

/// 列インデックスから役割へのマッピング
///
/// ヘッダー行の解釈時に一度だけ構築され、以降は変更されません。
/// ヘッダー行の幅を超える列は`Ignored`として扱います。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnRoles {
    roles: Vec<ColumnRole>,
}

impl ColumnRoles {
    /// 指定列の役割
    pub fn role(&self, col: usize) -> &ColumnRole {
        self.roles.get(col).unwrap_or(&IGNORED)
    }

    /// ヘッダー行の列数
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// 列順の(列インデックス, 役割)のイテレーター
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ColumnRole)> {
        self.roles.iter().enumerate()
    }

    /// `Metadata`列の数
    pub fn metadata_count(&self) -> usize {
        self.roles
            .iter()
            .filter(|role| matches!(role, ColumnRole::Metadata { .. }))
            .count()
    }
}

impl FromIterator<ColumnRole> for ColumnRoles {
    fn from_iter<I: IntoIterator<Item = ColumnRole>>(iter: I) -> Self {
        Self {
            roles: iter.into_iter().collect(),
        }
    }
}

/// ヘッダー解釈器
#[derive(Debug, Default)]
pub struct HeaderInterpreter;

impl HeaderInterpreter {
    /// ヘッダー行のすべての列を分類する
    ///
    /// 空セルも空文字列として分類されます（結果は`Ignored`）。
    pub fn interpret(&self, header: &SheetRow) -> ColumnRoles {
        header
            .cells
            .iter()
            .enumerate()
            .map(|(col, text)| {
                let role = ColumnRole::classify(text);
                trace!(
                    cell = %CellCoord::new(header.index, col as u32).to_a1_notation(),
                    ?role,
                    "classified header cell"
                );
                role
            })
            .collect()
    }
}
