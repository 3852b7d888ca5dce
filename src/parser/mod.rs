//! Parser Module
//!
//! 入力バイト列から行ストリームを生成するリーダーの実装。
//! スプレッドシートはcalamine、CSVは`csv`クレートで読み込みます。
//! どちらのリーダーも、行をファイル順に`SheetRow`として返します。

mod csv;
mod workbook;

pub(crate) use self::csv::CsvRows;
pub(crate) use self::workbook::WorkbookRows;

use crate::api::InputFormat;
use crate::builder::ConversionConfig;
use crate::error::SheetAssetError;
use crate::security::{OLE_MAGIC, ZIP_MAGIC};
use crate::types::SheetRow;

/// 実際に使用するリーダーの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReaderKind {
    Spreadsheet,
    Csv,
}

/// 入力形式とバイト列の先頭から、使用するリーダーを決定する
pub(crate) fn detect_reader(format: InputFormat, bytes: &[u8]) -> ReaderKind {
    match format {
        InputFormat::Spreadsheet => ReaderKind::Spreadsheet,
        InputFormat::Csv => ReaderKind::Csv,
        InputFormat::Auto => {
            if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
                ReaderKind::Spreadsheet
            } else {
                ReaderKind::Csv
            }
        }
    }
}

/// 行ストリーム（Strategy Pattern）
///
/// 各リーダーをenumとして表現し、`Iterator`として行を返します。
pub(crate) enum RowReader<'a> {
    Workbook(WorkbookRows<'a>),
    Csv(CsvRows),
}

impl<'a> RowReader<'a> {
    /// バイト列から行ストリームを開く
    ///
    /// # 引数
    ///
    /// * `bytes` - 入力ファイルの内容
    /// * `config` - 変換設定（入力形式、シート選択、日付形式、区切り文字）
    ///
    /// # 戻り値
    ///
    /// * `Ok(RowReader)` - 行ストリーム
    /// * `Err(SheetAssetError)` - ファイルを開けなかった場合、またはシートが見つからない場合
    pub fn open(bytes: Vec<u8>, config: &'a ConversionConfig) -> Result<Self, SheetAssetError> {
        match detect_reader(config.input_format, &bytes) {
            ReaderKind::Spreadsheet => Ok(RowReader::Workbook(WorkbookRows::open(bytes, config)?)),
            ReaderKind::Csv => Ok(RowReader::Csv(CsvRows::open(bytes, config.delimiter()))),
        }
    }
}

impl Iterator for RowReader<'_> {
    type Item = Result<SheetRow, SheetAssetError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            RowReader::Workbook(rows) => rows.next(),
            RowReader::Csv(rows) => rows.next(),
        }
    }
}
