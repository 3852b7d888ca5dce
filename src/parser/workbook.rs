//! Workbook Reader Module
//!
//! calamineを使用したスプレッドシートの行ストリーム。
//! XLSX/XLSM/XLSB/XLS/ODSを形式の自動判定で読み込みます。

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use tracing::debug;

use crate::api::SheetSelector;
use crate::builder::ConversionConfig;
use crate::error::SheetAssetError;
use crate::formatter::CellFormatter;
use crate::types::{CellValue, SheetRow};

/// ワークシートの行ストリーム
///
/// シートの使用範囲に関わらず、行はシートの1行目から、列はA列から出力します。
/// これにより、ヘッダー行は常にシートの1行目となり、各行は
/// 最終使用列までの幅を持ちます（空セルは空文字列）。
pub(crate) struct WorkbookRows<'a> {
    /// 選択されたシートのセル範囲
    range: Range<Data>,
    /// 出力する行数（最終使用行 + 1）
    height: u32,
    /// 出力する列数（最終使用列 + 1）
    width: u32,
    /// 次に出力する行インデックス
    next_row: u32,
    formatter: CellFormatter,
    config: &'a ConversionConfig,
}

impl<'a> WorkbookRows<'a> {
    /// ワークブックを開き、選択されたシートの行ストリームを生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookRows)` - シートの読み込みに成功した場合
    /// * `Err(SheetAssetError::Parse)` - ワークブックを開けなかった場合
    /// * `Err(SheetAssetError::MalformedInput)` - シートが見つからない場合
    pub fn open(bytes: Vec<u8>, config: &'a ConversionConfig) -> Result<Self, SheetAssetError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
        let sheet_names = workbook.sheet_names();

        let sheet_name = select_sheet(&sheet_names, &config.sheet_selector)?;
        let range = workbook.worksheet_range(&sheet_name)?;

        let (height, width) = match range.end() {
            Some((last_row, last_col)) => (last_row + 1, last_col + 1),
            None => (0, 0),
        };

        debug!(
            sheet = %sheet_name,
            rows = height,
            columns = width,
            "opened worksheet"
        );

        Ok(Self {
            range,
            height,
            width,
            next_row: 0,
            formatter: CellFormatter::new(),
            config,
        })
    }

    fn read_row(&self, row: u32) -> SheetRow {
        let cells = (0..self.width)
            .map(|col| {
                let value = self
                    .range
                    .get_value((row, col))
                    .map(to_cell_value)
                    .unwrap_or(CellValue::Empty);
                self.formatter.format_cell(&value, self.config)
            })
            .collect();
        SheetRow::new(row, cells)
    }
}

impl Iterator for WorkbookRows<'_> {
    type Item = Result<SheetRow, SheetAssetError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_row >= self.height {
            return None;
        }
        let row = self.read_row(self.next_row);
        self.next_row += 1;
        Some(Ok(row))
    }
}

/// シート選択方式に基づいてシート名を決定
fn select_sheet(sheet_names: &[String], selector: &SheetSelector) -> Result<String, SheetAssetError> {
    match selector {
        SheetSelector::First => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| SheetAssetError::MalformedInput("Workbook has no sheets".to_string())),

        SheetSelector::Index(index) => sheet_names.get(*index).cloned().ok_or_else(|| {
            SheetAssetError::MalformedInput(format!(
                "Sheet index {} is out of range (total: {})",
                index,
                sheet_names.len()
            ))
        }),

        SheetSelector::Name(name) => {
            if sheet_names.contains(name) {
                Ok(name.clone())
            } else {
                Err(SheetAssetError::MalformedInput(format!(
                    "Sheet '{}' not found",
                    name
                )))
            }
        }
    }
}

/// calamineのセルデータを`CellValue`に変換
fn to_cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => {
            if dt.is_duration() {
                CellValue::Number(dt.as_f64())
            } else {
                CellValue::DateTime {
                    serial: dt.as_f64(),
                    datetime: dt.as_datetime(),
                }
            }
        }
        // ODSの日付・期間はISO形式の文字列のまま出力
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
        Data::Empty => CellValue::Empty,
    }
}


// 実際のワークブックを使用したテストは統合テスト（tests/）で実装します。
