//! Output Format Module
//!
//! Strategy Patternによる出力フォーマットの抽象化を提供するモジュール。
//! 変換コアが構築した`AssetDocument`をバイト列に変換します。

mod formatters;

use crate::api::OutputFormat;
use crate::builder::ConversionConfig;
use crate::error::SheetAssetError;
use crate::types::AssetDocument;
use std::io::Write;

pub use formatters::*;

/// 出力フォーマッター（Strategy Pattern）
#[derive(Debug, Clone, Copy)]
pub enum OutputFormatter {
    Xml(XmlFormatter),
    Json,
}

impl OutputFormatter {
    /// 変換設定からフォーマッターを生成
    pub(crate) fn from_config(config: &ConversionConfig) -> Self {
        match config.output_format {
            OutputFormat::Xml => OutputFormatter::Xml(XmlFormatter {
                declaration: config.xml_declaration,
                indent: config.indent,
            }),
            OutputFormat::Json => OutputFormatter::Json,
        }
    }

    /// ドキュメントを指定されたフォーマットで出力する
    ///
    /// # 引数
    ///
    /// * `document` - 出力するドキュメント
    /// * `writer` - 出力先のライター
    pub fn render<W: Write>(
        &self,
        document: &AssetDocument,
        writer: &mut W,
    ) -> Result<(), SheetAssetError> {
        match self {
            OutputFormatter::Xml(formatter) => formatter.render(document, writer),
            OutputFormatter::Json => JsonFormatter.render(document, writer),
        }
    }
}
