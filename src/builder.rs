//! Builder Module
//!
//! Fluent Builder APIを提供し、`Converter`インスタンスを段階的に構築する。

use std::borrow::Cow;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::api::{
    csv_delimiter_for_path, DateFormat, InputFormat, OutputFormat, SheetSelector,
};
use crate::error::SheetAssetError;
use crate::formatter::DateFormatter;
use crate::output::OutputFormatter;
use crate::parser::{detect_reader, ReaderKind, RowReader};
use crate::security::{check_input_size, inspect_archive, SecurityConfig};
use crate::transform::Conversion;
use crate::types::AssetDocument;

/// インデント幅の上限
const MAX_INDENT: usize = 16;

/// 変換処理の設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct ConversionConfig {
    /// 入力形式
    pub input_format: InputFormat,

    /// シート選択方式
    pub sheet_selector: SheetSelector,

    /// 日付形式
    pub date_format: DateFormat,

    /// 出力フォーマット
    pub output_format: OutputFormat,

    /// CSVの区切り文字（未指定の場合は拡張子から決定）
    pub csv_delimiter: Option<u8>,

    /// XML宣言を出力するか
    pub xml_declaration: bool,

    /// 出力のインデント幅（0の場合は整形しない）
    pub indent: usize,

    /// セキュリティ制限
    pub security: SecurityConfig,
}

impl ConversionConfig {
    /// CSVの区切り文字
    pub fn delimiter(&self) -> u8 {
        self.csv_delimiter.unwrap_or(b',')
    }
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            input_format: InputFormat::Auto,
            sheet_selector: SheetSelector::First,
            date_format: DateFormat::Serial,
            output_format: OutputFormat::Xml,
            csv_delimiter: None,
            xml_declaration: false,
            indent: 2,
            security: SecurityConfig::default(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// `Converter`インスタンスを段階的に構築するためのビルダーです。
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use sheetasset::{ConverterBuilder, SheetSelector, OutputFormat};
///
/// # fn main() -> Result<(), sheetasset::SheetAssetError> {
/// let converter = ConverterBuilder::new()
///     .with_sheet_selector(SheetSelector::Name("Assets".to_string()))
///     .with_output_format(OutputFormat::Xml)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConverterBuilder {
    /// 内部設定（構築中）
    config: ConversionConfig,
}

impl Default for ConverterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConverterBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - 入力形式: 自動判定
    /// - シート選択: 最初のシート
    /// - 日付形式: シリアル値
    /// - 出力フォーマット: XML（インデント2、XML宣言なし）
    /// - CSV区切り文字: `,`（`convert_path`で`.tsv`を読む場合はタブ）
    /// - 入力サイズ上限: 2GB
    pub fn new() -> Self {
        Self {
            config: ConversionConfig::default(),
        }
    }

    /// 変換対象のシートを選択する
    ///
    /// # 引数
    ///
    /// * `selector: SheetSelector`: シート選択方式
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use sheetasset::{ConverterBuilder, SheetSelector};
    ///
    /// // 2番目のシート
    /// let builder = ConverterBuilder::new()
    ///     .with_sheet_selector(SheetSelector::Index(1));
    ///
    /// // シート名で指定
    /// let builder = ConverterBuilder::new()
    ///     .with_sheet_selector(SheetSelector::Name("Assets".to_string()));
    /// ```
    pub fn with_sheet_selector(mut self, selector: SheetSelector) -> Self {
        self.config.sheet_selector = selector;
        self
    }

    /// 入力形式を指定する
    ///
    /// `InputFormat::Auto`の場合はバイト列の先頭から判定します。
    pub fn with_input_format(mut self, format: InputFormat) -> Self {
        self.config.input_format = format;
        self
    }

    /// 日付の出力形式を指定する
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use sheetasset::{ConverterBuilder, DateFormat};
    ///
    /// let builder = ConverterBuilder::new()
    ///     .with_date_format(DateFormat::Custom("%Y年%m月%d日".to_string()));
    /// ```
    pub fn with_date_format(mut self, format: DateFormat) -> Self {
        self.config.date_format = format;
        self
    }

    /// 出力フォーマットを指定する
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    /// CSVの区切り文字を指定する
    ///
    /// # 制約
    ///
    /// * ASCII文字でなければならない
    /// * 改行文字と`"`は使用できない
    /// * 制約違反の場合、`build()`時に`SheetAssetError::Config`を返す
    pub fn with_csv_delimiter(mut self, delimiter: u8) -> Self {
        self.config.csv_delimiter = Some(delimiter);
        self
    }

    /// XML宣言（`<?xml version="1.0" encoding="UTF-8"?>`）を出力するかを指定する
    pub fn with_xml_declaration(mut self, declaration: bool) -> Self {
        self.config.xml_declaration = declaration;
        self
    }

    /// 出力のインデント幅を指定する（0〜16）
    ///
    /// 0を指定した場合、XMLは1行で出力されます。
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.config.indent = indent;
        self
    }

    /// 入力ファイルの最大サイズ（バイト）を指定する
    pub fn with_max_input_size(mut self, bytes: u64) -> Self {
        self.config.security.max_input_file_size = bytes;
        self
    }

    /// 設定を検証し、`Converter`インスタンスを生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(Converter)`: 設定が有効な場合、Converterインスタンス
    /// * `Err(SheetAssetError::Config)`: 設定が無効な場合
    ///
    /// # 発生し得るエラー
    ///
    /// * `SheetAssetError::Config(String)`: 設定の検証に失敗した場合
    ///   * インデント幅が16を超える
    ///   * CSV区切り文字が不正
    ///   * カスタム日付形式が空、不正な書式文字列、またはタイムゾーンを必要とする書式
    ///   * 入力サイズ上限が0
    ///   * シート名が空
    pub fn build(self) -> Result<Converter, SheetAssetError> {
        // 1. インデント幅の検証
        if self.config.indent > MAX_INDENT {
            return Err(SheetAssetError::Config(format!(
                "Invalid indent: {} (max: {})",
                self.config.indent, MAX_INDENT
            )));
        }

        // 2. CSV区切り文字の検証
        let delimiter = self.config.delimiter();
        if !delimiter.is_ascii() || matches!(delimiter, b'\n' | b'\r' | b'"') {
            return Err(SheetAssetError::Config(format!(
                "Invalid CSV delimiter: 0x{:02X}",
                delimiter
            )));
        }

        // 3. カスタム日付形式の検証（タイムゾーン指定子のように日時に適用できない書式も拒否）
        if let DateFormat::Custom(ref format_str) = self.config.date_format {
            if format_str.is_empty()
                || StrftimeItems::new(format_str).any(|item| matches!(item, Item::Error))
                || DateFormatter
                    .custom(&NaiveDateTime::default(), format_str)
                    .is_none()
            {
                return Err(SheetAssetError::Config(format!(
                    "Invalid date format string: '{}'",
                    format_str
                )));
            }
        }

        // 4. 入力サイズ上限の検証
        if self.config.security.max_input_file_size == 0 {
            return Err(SheetAssetError::Config(
                "Maximum input size must be greater than zero".to_string(),
            ));
        }

        // 5. シート名の検証
        if let SheetSelector::Name(ref name) = self.config.sheet_selector {
            if name.is_empty() {
                return Err(SheetAssetError::Config("Sheet name must not be empty".to_string()));
            }
        }

        Ok(Converter::new(self.config))
    }
}

/// 変換処理のファサード
///
/// スプレッドシートを読み込み、アセットドキュメントとして出力するための
/// メインエントリーポイントです。変換ごとに状態を新しく作成するため、
/// 1つの`Converter`を複数スレッドから同時に使用できます。
///
/// # 使用例
///
/// ```rust,no_run
/// use sheetasset::ConverterBuilder;
/// use std::fs::File;
///
/// # fn main() -> Result<(), sheetasset::SheetAssetError> {
/// let converter = ConverterBuilder::new().build()?;
/// let input = File::open("assets.xlsx")?;
/// let output = File::create("assets.xlsx.xml")?;
/// converter.convert(input, output)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Converter {
    /// 変換設定
    config: ConversionConfig,
}

impl Converter {
    pub(crate) fn new(config: ConversionConfig) -> Self {
        Self { config }
    }

    /// 出力フォーマット
    pub fn output_format(&self) -> OutputFormat {
        self.config.output_format
    }

    /// 入力を読み込み、`AssetDocument`を構築する
    ///
    /// # 処理フロー
    ///
    /// 1. 入力をメモリに読み込む（サイズ上限を超えた時点で中断）
    /// 2. ZIPコンテナの検査（スプレッドシートの場合）
    /// 3. 行ストリームを開く
    /// 4. 最初の行をヘッダーとして解釈し、以降の行をアセットに変換
    ///
    /// # 戻り値
    ///
    /// * `Ok(AssetDocument)` - 変換に成功した場合
    /// * `Err(SheetAssetError::InputMissing)` - 入力が空の場合
    /// * `Err(SheetAssetError)` - 読み込み・変換に失敗した場合
    pub fn convert_to_document<R: Read>(&self, input: R) -> Result<AssetDocument, SheetAssetError> {
        let buffer = self.read_input(input)?;
        self.document_from_bytes(buffer, &self.config)
    }

    /// 入力をアセットドキュメントに変換し、出力先に書き込む
    ///
    /// 出力はメモリ上で完成させてから書き込むため、変換に失敗した場合は
    /// 出力先に何も書き込まれません。
    ///
    /// # 引数
    ///
    /// * `input` - スプレッドシートまたはCSVを読み込むためのリーダー
    /// * `output` - 出力先のライター
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use sheetasset::ConverterBuilder;
    /// use std::io::Cursor;
    ///
    /// # fn main() -> Result<(), sheetasset::SheetAssetError> {
    /// let converter = ConverterBuilder::new().build()?;
    /// let csv = b"filename,1 Title\nphoto.jpg,Sunset\n".to_vec();
    /// converter.convert(Cursor::new(csv), std::io::stdout())?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn convert<R: Read, W: Write>(&self, input: R, mut output: W) -> Result<(), SheetAssetError> {
        let document = self.convert_to_document(input)?;

        let mut buffer = Vec::new();
        self.render(&document, &mut buffer)?;

        output.write_all(&buffer)?;
        output.flush()?;
        Ok(())
    }

    /// 入力をアセットドキュメントの文字列に変換する
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use sheetasset::ConverterBuilder;
    /// use std::io::Cursor;
    ///
    /// # fn main() -> Result<(), sheetasset::SheetAssetError> {
    /// let converter = ConverterBuilder::new().build()?;
    /// let csv = b"filename,1 Title\nphoto.jpg,Sunset\n".to_vec();
    /// let xml = converter.convert_to_string(Cursor::new(csv))?;
    /// assert!(xml.contains("<field ref=\"1\" title=\"Title\">Sunset</field>"));
    /// # Ok(())
    /// # }
    /// ```
    pub fn convert_to_string<R: Read>(&self, input: R) -> Result<String, SheetAssetError> {
        let mut buffer = Vec::new();
        self.convert(input, &mut buffer)?;

        let result = String::from_utf8(buffer).map_err(|e| {
            SheetAssetError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;

        Ok(result)
    }

    /// ファイルパスを指定して変換する
    ///
    /// 入力形式が`InputFormat::Auto`の場合、拡張子から形式を推定します。
    /// 区切り文字が未指定の場合、`.tsv`はタブ区切りとして読み込みます。
    ///
    /// # 戻り値
    ///
    /// * `Err(SheetAssetError::InputMissing)` - パスが存在しない、またはファイルでない場合
    pub fn convert_path<P: AsRef<Path>>(&self, path: P) -> Result<AssetDocument, SheetAssetError> {
        let path = path.as_ref();
        if !path.is_file() {
            debug!(path = %path.display(), "input path is not a file");
            return Err(SheetAssetError::InputMissing);
        }

        let input_format = match (self.config.input_format, InputFormat::from_path(path)) {
            (InputFormat::Auto, inferred) => inferred,
            (configured, _) => configured,
        };
        let csv_delimiter = self.config.csv_delimiter.or(csv_delimiter_for_path(path));

        let config = if input_format == self.config.input_format
            && csv_delimiter == self.config.csv_delimiter
        {
            Cow::Borrowed(&self.config)
        } else {
            Cow::Owned(ConversionConfig {
                input_format,
                csv_delimiter,
                ..self.config.clone()
            })
        };

        let buffer = self.read_input(File::open(path)?)?;
        self.document_from_bytes(buffer, &config)
    }

    /// 構築済みのドキュメントを設定されたフォーマットで書き込む
    pub fn render<W: Write>(
        &self,
        document: &AssetDocument,
        output: &mut W,
    ) -> Result<(), SheetAssetError> {
        OutputFormatter::from_config(&self.config).render(document, output)
    }

    /// 入力をサイズ上限まで読み込む
    fn read_input<R: Read>(&self, input: R) -> Result<Vec<u8>, SheetAssetError> {
        let limit = self.config.security.max_input_file_size;
        let mut buffer = Vec::new();
        // 上限を1バイト超えて読めた場合は違反として扱う
        input.take(limit.saturating_add(1)).read_to_end(&mut buffer)?;

        check_input_size(buffer.len() as u64, &self.config.security)?;
        if buffer.is_empty() {
            return Err(SheetAssetError::InputMissing);
        }
        Ok(buffer)
    }

    fn document_from_bytes(
        &self,
        buffer: Vec<u8>,
        config: &ConversionConfig,
    ) -> Result<AssetDocument, SheetAssetError> {
        let bytes = buffer.len();
        if detect_reader(config.input_format, &buffer) == ReaderKind::Spreadsheet {
            inspect_archive(&buffer, &config.security)?;
        }

        let rows = RowReader::open(buffer, config)?;
        let document = Conversion::run(rows)?;

        info!(bytes, assets = document.len(), "conversion finished");
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE_CSV: &[u8] = b"filename,1 Title,2 Ref Tag\nphoto.jpg,Sunset,Beach\n";

    #[test]
    fn test_converter_builder_new() {
        let builder = ConverterBuilder::new();
        assert_eq!(builder.config.input_format, InputFormat::Auto);
        assert_eq!(builder.config.sheet_selector, SheetSelector::First);
        assert_eq!(builder.config.date_format, DateFormat::Serial);
        assert_eq!(builder.config.output_format, OutputFormat::Xml);
        assert_eq!(builder.config.csv_delimiter, None);
        assert_eq!(builder.config.delimiter(), b',');
        assert!(!builder.config.xml_declaration);
        assert_eq!(builder.config.indent, 2);
    }

    #[test]
    fn test_builder_method_chaining() {
        let builder = ConverterBuilder::new()
            .with_sheet_selector(SheetSelector::Index(2))
            .with_input_format(InputFormat::Csv)
            .with_date_format(DateFormat::Iso8601)
            .with_output_format(OutputFormat::Json)
            .with_csv_delimiter(b';')
            .with_xml_declaration(true)
            .with_indent(4)
            .with_max_input_size(1024);

        assert_eq!(builder.config.sheet_selector, SheetSelector::Index(2));
        assert_eq!(builder.config.input_format, InputFormat::Csv);
        assert_eq!(builder.config.date_format, DateFormat::Iso8601);
        assert_eq!(builder.config.output_format, OutputFormat::Json);
        assert_eq!(builder.config.csv_delimiter, Some(b';'));
        assert!(builder.config.xml_declaration);
        assert_eq!(builder.config.indent, 4);
        assert_eq!(builder.config.security.max_input_file_size, 1024);
        assert!(builder.build().is_ok());
    }

    #[test]
    fn test_build_success() {
        assert!(ConverterBuilder::new().build().is_ok());
    }

    #[test]
    fn test_build_with_invalid_indent() {
        match ConverterBuilder::new().with_indent(17).build() {
            Err(SheetAssetError::Config(msg)) => assert!(msg.contains("indent")),
            other => panic!("Expected Config error, got {:?}", other),
        }
        assert!(ConverterBuilder::new().with_indent(16).build().is_ok());
        assert!(ConverterBuilder::new().with_indent(0).build().is_ok());
    }

    #[test]
    fn test_build_with_invalid_delimiter() {
        for delimiter in [b'\n', b'\r', b'"', 0xE3] {
            match ConverterBuilder::new().with_csv_delimiter(delimiter).build() {
                Err(SheetAssetError::Config(msg)) => assert!(msg.contains("delimiter")),
                other => panic!("Expected Config error, got {:?}", other),
            }
        }
        assert!(ConverterBuilder::new().with_csv_delimiter(b'\t').build().is_ok());
    }

    #[test]
    fn test_build_with_valid_custom_date_format() {
        let result = ConverterBuilder::new()
            .with_date_format(DateFormat::Custom("%Y-%m-%d".to_string()))
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_build_with_invalid_custom_date_format() {
        for format in ["", "%Q", "%Y %z", "%Z", "%:z"] {
            match ConverterBuilder::new()
                .with_date_format(DateFormat::Custom(format.to_string()))
                .build()
            {
                Err(SheetAssetError::Config(msg)) => assert!(msg.contains("Invalid date format")),
                other => panic!("Expected Config error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_build_with_zero_max_input_size() {
        assert!(matches!(
            ConverterBuilder::new().with_max_input_size(0).build(),
            Err(SheetAssetError::Config(_))
        ));
    }

    #[test]
    fn test_build_with_empty_sheet_name() {
        assert!(matches!(
            ConverterBuilder::new()
                .with_sheet_selector(SheetSelector::Name(String::new()))
                .build(),
            Err(SheetAssetError::Config(_))
        ));
    }

    #[test]
    fn test_convert_to_document_from_csv() {
        let converter = ConverterBuilder::new().build().unwrap();
        let document = converter
            .convert_to_document(Cursor::new(SAMPLE_CSV.to_vec()))
            .unwrap();

        assert_eq!(document.len(), 1);
        assert_eq!(document.assets[0].filename, "photo.jpg");
        assert_eq!(document.assets[0].metadata[1].title.as_deref(), Some("Ref Tag"));
    }

    #[test]
    fn test_convert_to_string_xml() {
        let converter = ConverterBuilder::new().build().unwrap();
        let xml = converter
            .convert_to_string(Cursor::new(SAMPLE_CSV.to_vec()))
            .unwrap();

        let expected = "<assets>\n  \
                        <asset>\n    \
                        <filename>photo.jpg</filename>\n    \
                        <metadata>\n      \
                        <field ref=\"1\" title=\"Title\">Sunset</field>\n      \
                        <field ref=\"2\" title=\"Ref Tag\">Beach</field>\n    \
                        </metadata>\n  \
                        </asset>\n\
                        </assets>\n";
        assert_eq!(xml, expected);
    }

    #[test]
    fn test_convert_empty_input_is_input_missing() {
        let converter = ConverterBuilder::new().build().unwrap();
        let result = converter.convert_to_string(Cursor::new(Vec::new()));
        match result {
            Err(e) => {
                assert!(matches!(e, SheetAssetError::InputMissing));
                assert!(e.is_user_correctable());
            }
            Ok(_) => panic!("Expected InputMissing"),
        }
    }

    #[test]
    fn test_convert_failure_writes_nothing() {
        let converter = ConverterBuilder::new()
            .with_input_format(InputFormat::Spreadsheet)
            .build()
            .unwrap();

        let mut output = Vec::new();
        let result = converter.convert(Cursor::new(b"not a workbook".to_vec()), &mut output);
        assert!(result.is_err());
        assert!(output.is_empty());
    }

    #[test]
    fn test_convert_input_size_limit() {
        let converter = ConverterBuilder::new()
            .with_max_input_size(10)
            .build()
            .unwrap();

        assert!(matches!(
            converter.convert_to_document(Cursor::new(SAMPLE_CSV.to_vec())),
            Err(SheetAssetError::SecurityViolation(_))
        ));
    }

    #[test]
    fn test_convert_path_missing() {
        let converter = ConverterBuilder::new().build().unwrap();
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            converter.convert_path(dir.path().join("missing.xlsx")),
            Err(SheetAssetError::InputMissing)
        ));
        // ディレクトリはファイルとして扱わない
        assert!(matches!(
            converter.convert_path(dir.path()),
            Err(SheetAssetError::InputMissing)
        ));
    }

    #[test]
    fn test_convert_path_infers_tsv() {
        let converter = ConverterBuilder::new().build().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assets.tsv");
        std::fs::write(&path, "filename\t1 Title\na.jpg\tA,B\n").unwrap();

        let document = converter.convert_path(&path).unwrap();
        assert_eq!(document.assets[0].filename, "a.jpg");
        assert_eq!(document.assets[0].metadata[0].value, "A,B");
    }

    #[test]
    fn test_convert_path_explicit_delimiter_wins_over_tsv() {
        let converter = ConverterBuilder::new()
            .with_csv_delimiter(b',')
            .build()
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assets.tsv");
        std::fs::write(&path, "filename,1 Title\na.jpg,A\n").unwrap();

        let document = converter.convert_path(&path).unwrap();
        assert_eq!(document.assets[0].filename, "a.jpg");
        assert_eq!(document.assets[0].metadata[0].value, "A");
    }

    #[test]
    fn test_timezone_date_format_is_rejected_before_conversion() {
        let result = ConverterBuilder::new()
            .with_date_format(DateFormat::Custom("%Y %z".to_string()))
            .build();
        match result {
            Err(SheetAssetError::Config(msg)) => assert!(msg.contains("%Y %z")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_converter_is_reusable() {
        let converter = ConverterBuilder::new().build().unwrap();
        let first = converter
            .convert_to_string(Cursor::new(SAMPLE_CSV.to_vec()))
            .unwrap();
        let second = converter
            .convert_to_string(Cursor::new(SAMPLE_CSV.to_vec()))
            .unwrap();
        assert_eq!(first, second);
    }
}
