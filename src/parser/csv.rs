//! CSV Reader Module
//!
//! `csv`クレートを使用したCSVの行ストリーム。
//! 1行目もデータとして読み込み（ヘッダー解釈は変換コアが行う）、
//! 列数が行ごとに異なることを許容します。
//!
//! `csv`クレートは空行を読み飛ばすため、レコード直前の空行を数え直し、
//! 空の行として出力します。これにより空行も1行として数えられ、
//! 先頭の空行はヘッダー行になります。ファイル末尾の空行は行になりません。

use std::io::Cursor;

use csv::{ReaderBuilder, StringRecordsIntoIter};

use crate::error::SheetAssetError;
use crate::types::SheetRow;

/// UTF-8 BOM
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// CSVの行ストリーム
pub(crate) struct CsvRows {
    records: StringRecordsIntoIter<Cursor<Vec<u8>>>,
    next_index: u32,

    /// 次のレコードより前に出力する空行の数
    blank_lines: u32,

    /// 空行の出力後に返すレコード
    pending: Option<Vec<String>>,
}

impl CsvRows {
    /// CSVのバイト列から行ストリームを生成
    ///
    /// 先頭のUTF-8 BOMは取り除きます。
    pub fn open(mut bytes: Vec<u8>, delimiter: u8) -> Self {
        if bytes.starts_with(UTF8_BOM) {
            bytes.drain(..UTF8_BOM.len());
        }

        let records = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(Cursor::new(bytes))
            .into_records();

        Self {
            records,
            next_index: 0,
            blank_lines: 0,
            pending: None,
        }
    }

    fn row(&mut self, cells: Vec<String>) -> SheetRow {
        let index = self.next_index;
        self.next_index += 1;
        SheetRow::new(index, cells)
    }
}

/// `start`から始まる空行の数を数える
///
/// `start`は直前のレコードを読み終えた位置です。`\r\n`の`\r`でレコードが
/// 終わっている場合、残った`\n`は直前のレコードの改行として扱います。
fn blank_lines_before(bytes: &[u8], start: usize) -> u32 {
    let mut rest = bytes.get(start..).unwrap_or_default();
    if start > 0 && bytes[start - 1] == b'\r' && rest.first() == Some(&b'\n') {
        rest = &rest[1..];
    }

    let mut lines = 0;
    let mut i = 0;
    while i < rest.len() {
        match rest[i] {
            b'\n' => lines += 1,
            b'\r' => {
                lines += 1;
                if rest.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
            }
            _ => break,
        }
        i += 1;
    }
    lines
}

impl Iterator for CsvRows {
    type Item = Result<SheetRow, SheetAssetError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.blank_lines == 0 {
            if let Some(cells) = self.pending.take() {
                return Some(Ok(self.row(cells)));
            }

            let start = self.records.reader().position().byte() as usize;
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(e) => return Some(Err(SheetAssetError::Csv(e))),
            };
            let cells: Vec<String> = record.iter().map(str::to_string).collect();

            self.blank_lines = blank_lines_before(self.records.reader().get_ref().get_ref(), start);
            if self.blank_lines == 0 {
                return Some(Ok(self.row(cells)));
            }
            self.pending = Some(cells);
        }

        self.blank_lines -= 1;
        Some(Ok(self.row(Vec::new())))
    }
}
