//! Output Formatters Implementation
//!
//! 各出力フォーマットの実装を提供するモジュール。

use std::borrow::Cow;
use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::SheetAssetError;
use crate::types::{AssetDocument, AssetRecord, MetadataField};

/// XML形式のフォーマッター
///
/// 空要素も`<filename></filename>`の形式で出力し、自己終了タグは使用しません。
/// テキストと属性値はquick-xmlがエスケープします。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XmlFormatter {
    /// `<?xml version="1.0" encoding="UTF-8"?>`を出力するか
    pub declaration: bool,
    /// インデント幅（0の場合は改行・インデントなし）
    pub indent: usize,
}

impl Default for XmlFormatter {
    fn default() -> Self {
        Self {
            declaration: false,
            indent: 2,
        }
    }
}

impl XmlFormatter {
    pub fn render<W: Write>(
        &self,
        document: &AssetDocument,
        writer: &mut W,
    ) -> Result<(), SheetAssetError> {
        let mut xml = if self.indent > 0 {
            Writer::new_with_indent(&mut *writer, b' ', self.indent)
        } else {
            Writer::new(&mut *writer)
        };

        if self.declaration {
            xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        }

        xml.write_event(Event::Start(BytesStart::new("assets")))?;
        if document.assets.is_empty() {
            write_empty_text(&mut xml)?;
        }
        for asset in &document.assets {
            write_asset(&mut xml, asset)?;
        }
        xml.write_event(Event::End(BytesEnd::new("assets")))?;

        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

fn write_asset<W: Write>(xml: &mut Writer<W>, asset: &AssetRecord) -> Result<(), SheetAssetError> {
    xml.write_event(Event::Start(BytesStart::new("asset")))?;

    xml.write_event(Event::Start(BytesStart::new("filename")))?;
    write_text(xml, &asset.filename)?;
    xml.write_event(Event::End(BytesEnd::new("filename")))?;

    xml.write_event(Event::Start(BytesStart::new("metadata")))?;
    if asset.metadata.is_empty() {
        write_empty_text(xml)?;
    }
    for field in &asset.metadata {
        write_field(xml, field)?;
    }
    xml.write_event(Event::End(BytesEnd::new("metadata")))?;

    xml.write_event(Event::End(BytesEnd::new("asset")))?;
    Ok(())
}

fn write_field<W: Write>(xml: &mut Writer<W>, field: &MetadataField) -> Result<(), SheetAssetError> {
    let mut start = BytesStart::new("field");
    // 値が存在する場合のみ属性を設定
    if let Some(ref_id) = &field.ref_id {
        start.push_attribute(("ref", sanitize_xml_text(ref_id).as_ref()));
    }
    if let Some(title) = &field.title {
        start.push_attribute(("title", sanitize_xml_text(title).as_ref()));
    }

    xml.write_event(Event::Start(start))?;
    write_text(xml, &field.value)?;
    xml.write_event(Event::End(BytesEnd::new("field")))?;
    Ok(())
}

fn write_text<W: Write>(xml: &mut Writer<W>, text: &str) -> Result<(), SheetAssetError> {
    let text = sanitize_xml_text(text);
    xml.write_event(Event::Text(BytesText::new(&text)))?;
    Ok(())
}

/// 空のテキストを書き込み、閉じタグが改行されないようにする
fn write_empty_text<W: Write>(xml: &mut Writer<W>) -> Result<(), SheetAssetError> {
    xml.write_event(Event::Text(BytesText::new("")))?;
    Ok(())
}

/// XML 1.0で使用できない文字を取り除く
///
/// タブ・改行・復帰以外の制御文字、サロゲート外の非文字（U+FFFE, U+FFFF）が対象。
fn sanitize_xml_text(text: &str) -> Cow<'_, str> {
    fn is_xml_char(c: char) -> bool {
        matches!(c,
            '\u{9}' | '\u{A}' | '\u{D}'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}')
    }

    if text.chars().all(is_xml_char) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|c| is_xml_char(*c)).collect())
    }
}

/// JSON形式のフォーマッター
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn render<W: Write>(
        &self,
        document: &AssetDocument,
        writer: &mut W,
    ) -> Result<(), SheetAssetError> {
        serde_json::to_writer_pretty(&mut *writer, document)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}
