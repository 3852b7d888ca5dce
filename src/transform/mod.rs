//! Transform Module
//!
//! 行ストリームから`AssetDocument`を構築する変換コア。
//!
//! 変換は2段階の状態機械として動作します。
//!
//! 1. `AwaitingHeader`: 最初の行をヘッダーとして解釈し、列の役割を決定
//! 2. `ProcessingRows`: 以降の各行をアセットに変換し、行順に追加
//!
//! ヘッダー解釈後は`ProcessingRows`から戻ることはありません。

mod assemble;
mod header;
mod row;

pub use assemble::DocumentAssembler;
pub use header::{ColumnRole, ColumnRoles, HeaderInterpreter, FILENAME_HEADER};
pub use row::RowTransformer;

use tracing::trace;

use crate::error::SheetAssetError;
use crate::types::{AssetDocument, SheetRow};

/// 変換の状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionState {
    /// ヘッダー行を待っている
    AwaitingHeader,

    /// ヘッダー解釈済み、データ行を処理中
    ProcessingRows(ColumnRoles),
}

/// 1回の変換
///
/// 列の役割はこのインスタンスに閉じており、変換間で再利用されません。
///
/// # 使用例
///
/// ```rust
/// use sheetasset::{Conversion, SheetRow};
///
/// # fn main() -> Result<(), sheetasset::SheetAssetError> {
/// let mut conversion = Conversion::new();
/// conversion.push_row(&SheetRow::new(0, vec!["filename".into(), "1 Title".into()]))?;
/// conversion.push_row(&SheetRow::new(1, vec!["photo.jpg".into(), "Sunset".into()]))?;
///
/// let document = conversion.finish();
/// assert_eq!(document.assets[0].filename, "photo.jpg");
/// assert_eq!(document.assets[0].metadata[0].value, "Sunset");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Conversion {
    state: ConversionState,
    assembler: DocumentAssembler,
}

impl Conversion {
    pub fn new() -> Self {
        Self {
            state: ConversionState::AwaitingHeader,
            assembler: DocumentAssembler::new(),
        }
    }

    /// 現在の状態
    pub fn state(&self) -> &ConversionState {
        &self.state
    }

    /// 次の行を処理する
    ///
    /// 最初の行はヘッダーとして解釈され、アセットは生成されません。
    pub fn push_row(&mut self, row: &SheetRow) -> Result<(), SheetAssetError> {
        match &self.state {
            ConversionState::AwaitingHeader => {
                let roles = HeaderInterpreter.interpret(row);
                trace!(
                    columns = roles.len(),
                    metadata_columns = roles.metadata_count(),
                    "header interpreted"
                );
                self.state = ConversionState::ProcessingRows(roles);
            }
            ConversionState::ProcessingRows(roles) => {
                let record = RowTransformer::new(roles).transform(row);
                trace!(
                    row = row.index,
                    fields = record.metadata.len(),
                    "row transformed"
                );
                self.assembler.push(record)?;
            }
        }
        Ok(())
    }

    /// 変換を完了し、ドキュメントを返す
    ///
    /// ヘッダー行のみ、または行が1つもない場合は空のドキュメントになります。
    pub fn finish(self) -> AssetDocument {
        self.assembler.finish()
    }

    /// 行ストリーム全体を変換する
    ///
    /// 途中でエラーが発生した場合、構築中のドキュメントは破棄されます。
    pub fn run<I>(rows: I) -> Result<AssetDocument, SheetAssetError>
    where
        I: IntoIterator<Item = Result<SheetRow, SheetAssetError>>,
    {
        let mut conversion = Self::new();
        for row in rows {
            conversion.push_row(&row?)?;
        }
        Ok(conversion.finish())
    }
}

impl Default for Conversion {
    fn default() -> Self {
        Self::new()
    }
}
