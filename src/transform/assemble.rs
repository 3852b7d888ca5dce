//! Document Assembler Module
//!
//! アセットレコードを行順に蓄積し、`AssetDocument`を構築する。
//! XMLのエスケープは行わない（出力フォーマッターの責務）。

use crate::error::SheetAssetError;
use crate::types::{AssetDocument, AssetRecord};

/// ドキュメント組み立て器
///
/// 変換ごとに新しいインスタンスを使用し、インスタンス間で状態は共有しません。
#[derive(Debug, Default)]
pub struct DocumentAssembler {
    assets: Vec<AssetRecord>,
}

impl DocumentAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// レコードを末尾に追加する
    ///
    /// # エラー
    ///
    /// レコードの元の行インデックスが直前のレコード以下の場合は
    /// `SheetAssetError::Transform`を返します。
    pub fn push(&mut self, record: AssetRecord) -> Result<(), SheetAssetError> {
        if let Some(last) = self.assets.last() {
            if record.row <= last.row {
                return Err(SheetAssetError::Transform(format!(
                    "row {} arrived after row {}",
                    record.row, last.row
                )));
            }
        }
        self.assets.push(record);
        Ok(())
    }

    /// 追加済みのレコード数
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// ドキュメントを完成させる
    pub fn finish(self) -> AssetDocument {
        AssetDocument {
            assets: self.assets,
        }
    }

    /// レコード列から一度にドキュメントを構築する
    pub fn assemble<I>(records: I) -> Result<AssetDocument, SheetAssetError>
    where
        I: IntoIterator<Item = AssetRecord>,
    {
        let mut assembler = Self::new();
        for record in records {
            assembler.push(record)?;
        }
        Ok(assembler.finish())
    }
}
