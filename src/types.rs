//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use chrono::NaiveDateTime;
use serde::Serialize;

/// リーダーから取得したセルの値
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CellValue {
    /// 数値（f64）
    Number(f64),

    /// 文字列
    String(String),

    /// 論理値
    Bool(bool),

    /// 日付時刻
    ///
    /// `serial`はExcelのシリアル値、`datetime`は変換に成功した場合の日時
    DateTime {
        serial: f64,
        datetime: Option<NaiveDateTime>,
    },

    /// エラー値（例: #DIV/0!）
    Error(String),

    /// 空セル
    Empty,
}

/// セル座標（0始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    /// 新しい座標を生成
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// A1形式の文字列に変換（例: (0, 0) -> "A1"）
    #[allow(clippy::wrong_self_convention)]
    pub fn to_a1_notation(&self) -> String {
        let col_str = Self::col_index_to_letter(self.col);
        format!("{}{}", col_str, self.row + 1)
    }

    /// 列インデックスを文字列に変換（0 -> "A", 25 -> "Z", 26 -> "AA"）
    fn col_index_to_letter(mut col: u32) -> String {
        let mut result = String::new();
        loop {
            let remainder = col % 26;
            result.insert(0, (b'A' + remainder as u8) as char);
            if col < 26 {
                break;
            }
            col = col / 26 - 1;
        }
        result
    }
}

/// リーダーが生成する1行分のデータ
///
/// `cells`は列順の文字列値で、シートの宣言された幅までパディングされます。
/// 範囲外の列は空文字列として扱います。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    /// シート内の行インデックス（0始まり）
    pub index: u32,

    /// 列順のセル文字列
    pub cells: Vec<String>,
}

impl SheetRow {
    /// 新しい行を生成
    pub fn new(index: u32, cells: Vec<String>) -> Self {
        Self { index, cells }
    }

    /// 指定列のセル文字列を取得（存在しない列は空文字列）
    pub fn cell(&self, col: usize) -> &str {
        self.cells.get(col).map(String::as_str).unwrap_or("")
    }

    /// 行の幅（列数）
    pub fn width(&self) -> usize {
        self.cells.len()
    }
}

/// メタデータフィールド
///
/// `<field ref="..." title="...">value</field>`として出力されます。
/// `ref_id`と`title`は値が存在する場合のみ属性として出力されます。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataField {
    /// ヘッダーから取得した参照番号（数字列）
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,

    /// ヘッダーから取得したフィールド名
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// セルの値
    pub value: String,
}

/// 1つのデータ行に対応するアセットレコード
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetRecord {
    /// 元の行インデックス（0始まり、出力には含まれない）
    #[serde(skip)]
    pub row: u32,

    /// ファイル名（該当列がない場合は空文字列）
    pub filename: String,

    /// 列順のメタデータフィールド
    pub metadata: Vec<MetadataField>,
}

impl AssetRecord {
    /// 空のレコードを生成
    pub fn new(row: u32) -> Self {
        Self {
            row,
            filename: String::new(),
            metadata: Vec::new(),
        }
    }
}

/// 変換結果のドキュメント
///
/// ルート要素`assets`と、行順に並んだアセットのリストです。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssetDocument {
    /// 行順のアセット
    pub assets: Vec<AssetRecord>,
}

impl AssetDocument {
    /// アセットの数
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// アセットが1つもないかどうか
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_coord_to_a1_notation() {
        assert_eq!(CellCoord::new(0, 0).to_a1_notation(), "A1");
        assert_eq!(CellCoord::new(0, 25).to_a1_notation(), "Z1");
        assert_eq!(CellCoord::new(0, 26).to_a1_notation(), "AA1");
        assert_eq!(CellCoord::new(99, 701).to_a1_notation(), "ZZ100");
        assert_eq!(CellCoord::new(0, 52).to_a1_notation(), "BA1");
    }

    #[test]
    fn test_sheet_row_cell_out_of_range() {
        let row = SheetRow::new(3, vec!["a".to_string(), String::new()]);
        assert_eq!(row.cell(0), "a");
        assert_eq!(row.cell(1), "");
        assert_eq!(row.cell(7), "");
        assert_eq!(row.width(), 2);
    }

    #[test]
    fn test_asset_record_new_is_empty() {
        let record = AssetRecord::new(4);
        assert_eq!(record.row, 4);
        assert_eq!(record.filename, "");
        assert!(record.metadata.is_empty());
    }

    #[test]
    fn test_asset_document_json_shape() {
        let document = AssetDocument {
            assets: vec![AssetRecord {
                row: 1,
                filename: "photo.jpg".to_string(),
                metadata: vec![
                    MetadataField {
                        ref_id: Some("1".to_string()),
                        title: Some("Title".to_string()),
                        value: "Sunset".to_string(),
                    },
                    MetadataField {
                        ref_id: None,
                        title: None,
                        value: "bare".to_string(),
                    },
                ],
            }],
        };

        let json = serde_json::to_value(&document).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "assets": [{
                    "filename": "photo.jpg",
                    "metadata": [
                        {"ref": "1", "title": "Title", "value": "Sunset"},
                        {"value": "bare"}
                    ]
                }]
            })
        );
    }

    #[allow(unused_doc_comments)]
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_a1_notation_shape(row in 0u32..10000, col in 0u32..10000) {
                let a1 = CellCoord::new(row, col).to_a1_notation();

                let letters: String = a1.chars().take_while(|c| c.is_ascii_uppercase()).collect();
                let digits: String = a1.chars().skip(letters.len()).collect();

                prop_assert!(!letters.is_empty());
                prop_assert!(digits.chars().all(|c| c.is_ascii_digit()));
                prop_assert_eq!(digits.parse::<u32>().unwrap(), row + 1);
            }
        }
    }
}
