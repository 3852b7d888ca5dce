//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// エラーの分類
///
/// 呼び出し側が「ユーザーが修正可能な入力エラー」と「内部処理の失敗」を
/// 区別するために使用します。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// 入力ファイルが与えられていない（ユーザーが再試行で解決可能）
    InputMissing,

    /// 入力を行ストリームとして読み込めなかった
    MalformedInput,

    /// ドキュメント構築中の不変条件違反、または出力の失敗
    Transform,

    /// `ConverterBuilder::build()`時の設定エラー
    Config,
}

/// sheetassetクレート全体で使用するエラー型
///
/// スプレッドシートの読み込み、行の変換、XML出力の各段階で発生する
/// すべてのエラーを統一的に扱います。`kind()`で分類を取得できます。
///
/// # 使用例
///
/// ```rust,no_run
/// use sheetasset::{ConverterBuilder, SheetAssetError};
/// use std::fs::File;
///
/// fn run(path: &str) -> Result<(), SheetAssetError> {
///     let converter = ConverterBuilder::new().build()?;
///     let input = File::open(path)?;  // Ioエラーが自動的に変換される
///     let xml = converter.convert_to_string(input)?;
///     println!("{}", xml);
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum SheetAssetError {
    /// ファイルがアップロードされていない（入力が空、またはパスが存在しない）
    #[error("File was not uploaded")]
    InputMissing,

    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// スプレッドシートの解析中に発生したエラー（calamine由来）
    #[error("Failed to parse spreadsheet: {0}")]
    Parse(#[from] calamine::Error),

    /// CSVの読み込み中に発生したエラー
    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    /// ZIPアーカイブの検査中に発生したエラー
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// 行ストリームを生成できなかったその他の入力エラー
    ///
    /// シートが見つからない場合など。
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// セキュリティ制限に違反したエラー
    ///
    /// 入力サイズの上限、ZIP bomb、パストラバーサルなど。
    #[error("Security violation: {0}")]
    SecurityViolation(String),

    /// ドキュメント構築中の不変条件違反
    #[error("Transform error: {0}")]
    Transform(String),

    /// XML出力中に発生したエラー
    #[error("XML write error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// JSON出力中に発生したエラー
    #[error("JSON write error: {0}")]
    Json(#[from] serde_json::Error),

    /// 設定の検証に失敗したエラー
    ///
    /// # 例
    ///
    /// ```rust,no_run
    /// use sheetasset::{ConverterBuilder, SheetAssetError};
    ///
    /// let result = ConverterBuilder::new()
    ///     .with_indent(64)  // 上限を超えるインデント幅
    ///     .build();
    ///
    /// match result {
    ///     Err(SheetAssetError::Config(msg)) => {
    ///         println!("設定エラー: {}", msg);
    ///     }
    ///     _ => {}
    /// }
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SheetAssetError {
    /// エラーの分類を取得
    pub fn kind(&self) -> ErrorKind {
        match self {
            SheetAssetError::InputMissing => ErrorKind::InputMissing,
            SheetAssetError::Io(_)
            | SheetAssetError::Parse(_)
            | SheetAssetError::Csv(_)
            | SheetAssetError::Zip(_)
            | SheetAssetError::MalformedInput(_)
            | SheetAssetError::SecurityViolation(_) => ErrorKind::MalformedInput,
            SheetAssetError::Transform(_) | SheetAssetError::Xml(_) | SheetAssetError::Json(_) => {
                ErrorKind::Transform
            }
            SheetAssetError::Config(_) => ErrorKind::Config,
        }
    }

    /// ユーザーが入力をやり直すことで解決できるエラーかどうか
    pub fn is_user_correctable(&self) -> bool {
        self.kind() == ErrorKind::InputMissing
    }
}
