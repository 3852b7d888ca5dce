//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

use std::path::Path;

/// 入力ファイル形式
///
/// 行ストリームを生成するリーダーの選択方法を指定します。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InputFormat {
    /// バイト列の先頭から自動判定（デフォルト）
    ///
    /// ZIP（XLSX/XLSM/XLSB/ODS）またはOLE2（XLS）のシグネチャを持つ場合は
    /// スプレッドシート、それ以外はCSVとして扱います。
    Auto,

    /// スプレッドシート（calamineで読み込み可能な形式）
    Spreadsheet,

    /// CSV（区切り文字は`ConverterBuilder::with_csv_delimiter`で指定）
    Csv,
}

impl InputFormat {
    /// ファイル名の拡張子から入力形式を推定する
    ///
    /// `.csv`、`.tsv`、`.txt`はCSV、それ以外は`Auto`を返します。
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use sheetasset::InputFormat;
    ///
    /// assert_eq!(InputFormat::from_path("assets.csv"), InputFormat::Csv);
    /// assert_eq!(InputFormat::from_path("assets.xlsx"), InputFormat::Auto);
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") | Some("tsv") | Some("txt") => InputFormat::Csv,
            _ => InputFormat::Auto,
        }
    }
}

/// 拡張子から決まるCSVの区切り文字（`.tsv`はタブ）
pub(crate) fn csv_delimiter_for_path(path: &Path) -> Option<u8> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.eq_ignore_ascii_case("tsv"))
        .map(|_| b'\t')
}

/// シート選択方式
///
/// スプレッドシート入力のうち、変換対象とするシートを指定します。
/// CSV入力では無視されます。
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SheetSelector {
    /// 最初のシート（デフォルト）
    First,

    /// インデックス指定（0始まり）
    ///
    /// 例: `SheetSelector::Index(1)` は2番目のシートを選択
    Index(usize),

    /// シート名指定
    ///
    /// 例: `SheetSelector::Name("Assets".to_string())`
    Name(String),
}

/// 日付の出力形式
///
/// 日付セルを文字列に変換する際の形式を指定します。
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DateFormat {
    /// ISO 8601形式
    ///
    /// 時刻成分がない場合は`2025-11-20`、ある場合は`2025-11-20T09:30:00`
    Iso8601,

    /// カスタム形式（chrono互換フォーマット文字列）
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use sheetasset::{ConverterBuilder, DateFormat};
    ///
    /// # fn main() -> Result<(), sheetasset::SheetAssetError> {
    /// let converter = ConverterBuilder::new()
    ///     .with_date_format(DateFormat::Custom("%d/%m/%Y".to_string()))
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    Custom(String),

    /// Excelのシリアル値をそのまま出力（デフォルト）
    ///
    /// 例: `2025-01-02` → `45659`、`2025-01-02 12:00` → `45659.5`
    Serial,
}

/// 出力フォーマット
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OutputFormat {
    /// XML形式（デフォルト）
    ///
    /// # 出力例
    ///
    /// ```xml
    /// <assets>
    ///   <asset>
    ///     <filename>photo.jpg</filename>
    ///     <metadata>
    ///       <field ref="1" title="Title">Sunset</field>
    ///     </metadata>
    ///   </asset>
    /// </assets>
    /// ```
    Xml,

    /// JSON形式
    ///
    /// # 出力例
    ///
    /// ```json
    /// {
    ///   "assets": [
    ///     {
    ///       "filename": "photo.jpg",
    ///       "metadata": [
    ///         { "ref": "1", "title": "Title", "value": "Sunset" }
    ///       ]
    ///     }
    ///   ]
    /// }
    /// ```
    Json,
}

impl OutputFormat {
    /// 出力ファイルの拡張子
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Xml => "xml",
            OutputFormat::Json => "json",
        }
    }
}

/// アップロードされたファイル名から出力ファイル名を生成する
///
/// 元のファイル名（拡張子を含む）に出力形式の拡張子を付加します。
///
/// # 使用例
///
/// ```rust
/// use sheetasset::{output_file_name, OutputFormat};
///
/// assert_eq!(output_file_name("assets.xlsx", OutputFormat::Xml), "assets.xlsx.xml");
/// ```
pub fn output_file_name(upload_name: &str, format: OutputFormat) -> String {
    format!("{}.{}", upload_name, format.extension())
}
