//! Formatter Module
//!
//! セル値を文字列に変換するモジュール。
//! 変換コアにはすべてのセルが文字列として渡されます。
//!
//! デフォルトでは値をそのまま文字列化します。日付セルはシリアル値、
//! 真偽値は真が`1`、偽が空文字列になります。

use std::fmt::Write;

use chrono::{NaiveDateTime, NaiveTime};

use crate::api::DateFormat;
use crate::builder::ConversionConfig;
use crate::types::CellValue;

/// セルフォーマッター
///
/// セル値のフォーマット処理のファサードとして機能します。
#[derive(Debug)]
pub(crate) struct CellFormatter {
    /// 日付フォーマッター
    date_formatter: DateFormatter,

    /// 数値フォーマッター
    number_formatter: NumberFormatter,
}

impl CellFormatter {
    /// 新しいCellFormatterインスタンスを生成
    pub fn new() -> Self {
        Self {
            date_formatter: DateFormatter,
            number_formatter: NumberFormatter,
        }
    }

    /// セル値を文字列に変換
    ///
    /// # 引数
    ///
    /// * `value` - リーダーから取得したセル値
    /// * `config` - 変換設定
    ///
    /// # 戻り値
    ///
    /// 変換後の文字列。空セルは空文字列になります。
    pub fn format_cell(&self, value: &CellValue, config: &ConversionConfig) -> String {
        match value {
            CellValue::Number(n) => self.number_formatter.format(*n),
            CellValue::String(s) => s.clone(),
            CellValue::Bool(true) => "1".to_string(),
            CellValue::Bool(false) => String::new(),
            CellValue::DateTime { serial, datetime } => {
                let formatted = match (&config.date_format, datetime) {
                    (DateFormat::Iso8601, Some(datetime)) => {
                        Some(self.date_formatter.iso8601(datetime))
                    }
                    (DateFormat::Custom(format_str), Some(datetime)) => {
                        self.date_formatter.custom(datetime, format_str)
                    }
                    _ => None,
                };
                // シリアル値指定、または範囲外の日付はシリアル値で出力
                formatted.unwrap_or_else(|| self.number_formatter.format(*serial))
            }
            CellValue::Error(e) => e.clone(),
            CellValue::Empty => String::new(),
        }
    }
}

impl Default for CellFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// 日付フォーマッター
#[derive(Debug)]
pub(crate) struct DateFormatter;

impl DateFormatter {
    /// ISO 8601形式で出力
    ///
    /// 時刻成分が00:00:00の場合は日付のみを出力します。
    pub fn iso8601(&self, datetime: &NaiveDateTime) -> String {
        if datetime.time() == NaiveTime::MIN {
            datetime.format("%Y-%m-%d").to_string()
        } else {
            datetime.format("%Y-%m-%dT%H:%M:%S").to_string()
        }
    }

    /// chrono互換の書式文字列で出力
    ///
    /// タイムゾーンを必要とする指定子（`%z`、`%Z`など）は日時に適用できないため
    /// `None`を返します。
    pub fn custom(&self, datetime: &NaiveDateTime, format_str: &str) -> Option<String> {
        let mut formatted = String::new();
        write!(formatted, "{}", datetime.format(format_str)).ok()?;
        Some(formatted)
    }
}

/// 数値フォーマッター
///
/// 整数値の浮動小数点数は小数点なしで出力します（`5.0` → `5`）。
#[derive(Debug)]
pub(crate) struct NumberFormatter;

impl NumberFormatter {
    pub fn format(&self, value: f64) -> String {
        value.to_string()
    }
}
