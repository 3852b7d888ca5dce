//! sheetasset - Convert asset spreadsheets into metadata XML
//!
//! This crate reads a spreadsheet (XLSX, XLSM, XLSB, XLS, ODS or CSV) whose first
//! row is a header and turns every following row into an `<asset>` element with a
//! filename and a list of metadata fields.
//!
//! Header cells are interpreted as follows:
//!
//! - `filename`: the column holds the asset's filename
//! - `<digits> <title>` (e.g. `1 Title`): the column becomes a metadata field with
//!   `ref="<digits>"` and `title="<title>"`
//! - anything else: the column is ignored
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::fs::File;
//! use sheetasset::ConverterBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a converter with default settings
//!     let converter = ConverterBuilder::new().build()?;
//!
//!     let input = File::open("assets.xlsx")?;
//!     let output = File::create("assets.xlsx.xml")?;
//!
//!     // Nothing is written to `output` if the conversion fails
//!     converter.convert(input, output)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! Given the rows
//!
//! | filename  | 1 Title | 2 Ref Tag |
//! |-----------|---------|-----------|
//! | photo.jpg | Sunset  | Beach     |
//!
//! the converter produces
//!
//! ```xml
//! <assets>
//!   <asset>
//!     <filename>photo.jpg</filename>
//!     <metadata>
//!       <field ref="1" title="Title">Sunset</field>
//!       <field ref="2" title="Ref Tag">Beach</field>
//!     </metadata>
//!   </asset>
//! </assets>
//! ```
//!
//! # Custom Configuration
//!
//! ```rust,no_run
//! use sheetasset::{ConverterBuilder, DateFormat, OutputFormat, SheetSelector};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new()
//!         .with_sheet_selector(SheetSelector::Name("Assets".to_string()))
//!         .with_date_format(DateFormat::Custom("%d/%m/%Y".to_string()))
//!         .with_output_format(OutputFormat::Json)
//!         .build()?;
//!
//!     let document = converter.convert_path("assets.xlsx")?;
//!     println!("{} assets", document.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Error Handling
//!
//! Every failure is a [`SheetAssetError`]. Use [`SheetAssetError::is_user_correctable`]
//! to tell a missing upload apart from an internal processing failure.

mod api;
mod builder;
mod error;
mod formatter;
mod output;
mod parser;
mod security;
mod transform;
mod types;

// 公開API
pub use api::{output_file_name, DateFormat, InputFormat, OutputFormat, SheetSelector};
pub use builder::{Converter, ConverterBuilder};
pub use error::{ErrorKind, SheetAssetError};
pub use transform::{
    ColumnRole, ColumnRoles, Conversion, ConversionState, DocumentAssembler, HeaderInterpreter,
    RowTransformer, FILENAME_HEADER,
};
pub use types::{AssetDocument, AssetRecord, MetadataField, SheetRow};
