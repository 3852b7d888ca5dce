//! Row Transformer Module
//!
//! データ行を列の役割に従って`AssetRecord`に変換する。

use crate::transform::header::{ColumnRole, ColumnRoles};
use crate::types::{AssetRecord, MetadataField, SheetRow};

/// 行変換器
///
/// ヘッダー解釈の結果を借用し、各データ行を1つのアセットに変換します。
#[derive(Debug)]
pub struct RowTransformer<'a> {
    roles: &'a ColumnRoles,
}

impl<'a> RowTransformer<'a> {
    pub fn new(roles: &'a ColumnRoles) -> Self {
        Self { roles }
    }

    /// データ行を変換する
    ///
    /// ヘッダー行のすべての列を列順に走査します。行がヘッダーより短い場合、
    /// 不足する列は空文字列として扱います。ヘッダーより長い部分は無視されます。
    /// 内容が空の行でもレコードは必ず生成されます。
    pub fn transform(&self, row: &SheetRow) -> AssetRecord {
        let mut record = AssetRecord::new(row.index);

        for (col, role) in self.roles.iter() {
            let text = row.cell(col);
            match role {
                // 複数のファイル名列がある場合は最後の列が優先
                ColumnRole::Filename => record.filename = text.to_string(),
                ColumnRole::Metadata { ref_id, title } => record.metadata.push(MetadataField {
                    ref_id: Some(ref_id.clone()),
                    title: Some(title.clone()),
                    value: text.to_string(),
                }),
                ColumnRole::Ignored => {}
            }
        }

        record
    }
}
