//! sheetasset CLI
//!
//! 1つ以上のスプレッドシートを変換し、`<入力ファイル名>.xml`として書き出す。
//! 複数のファイルはrayonで並列に変換されます。

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use rayon::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sheetasset::{
    output_file_name, Converter, ConverterBuilder, DateFormat, InputFormat, OutputFormat,
    SheetAssetError, SheetSelector,
};

/// 内部処理に失敗した場合の終了コード
const EXIT_FAILURE: u8 = 1;

/// 入力が見つからない、または設定が不正な場合の終了コード
const EXIT_USAGE: u8 = 2;

#[derive(Parser)]
#[command(
    name = "sheetasset",
    version,
    about = "Convert asset spreadsheets into metadata XML",
    long_about = "Convert asset spreadsheets into metadata XML.\n\n\
                  The first row is the header: a `filename` column holds the asset file name,\n\
                  columns titled `<number> <title>` become metadata fields, others are ignored."
)]
struct Cli {
    /// Spreadsheet or CSV files to convert.
    #[arg(value_name = "FILE", required = true)]
    inputs: Vec<PathBuf>,

    /// Directory for the generated files (default: next to each input).
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Output format.
    #[arg(long = "format", value_enum, default_value = "xml")]
    format: FormatArg,

    /// Input format (auto detects spreadsheets by signature, then by extension).
    #[arg(long = "input-format", value_enum, default_value = "auto")]
    input_format: InputFormatArg,

    /// Zero-based index of the sheet to convert.
    #[arg(long = "sheet-index", value_name = "N", conflicts_with = "sheet_name")]
    sheet_index: Option<usize>,

    /// Name of the sheet to convert.
    #[arg(long = "sheet-name", value_name = "NAME")]
    sheet_name: Option<String>,

    /// Field delimiter for CSV input (default: `,`, or tab for `.tsv` files).
    #[arg(long = "delimiter")]
    delimiter: Option<char>,

    /// Date cell format: `serial`, `iso`, or a chrono format string such as `%d/%m/%Y`.
    #[arg(long = "date-format", value_name = "FORMAT", default_value = "serial")]
    date_format: String,

    /// Emit an XML declaration.
    #[arg(long = "xml-declaration")]
    xml_declaration: bool,

    /// Indentation width (0 writes everything on one line).
    #[arg(long = "indent", default_value_t = 2)]
    indent: usize,

    /// Maximum input file size in bytes.
    #[arg(long = "max-input-size", value_name = "BYTES")]
    max_input_size: Option<u64>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    verbosity: Verbosity<WarnLevel>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Xml,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum InputFormatArg {
    Auto,
    Spreadsheet,
    Csv,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.verbosity);

    let converter = match build_converter(&cli) {
        Ok(converter) => converter,
        Err(error) => {
            eprintln!("error: {error}");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    // 並列に書き込む前に、同じ出力先を持つ入力を検出
    let jobs: Vec<(&PathBuf, Option<PathBuf>)> = cli
        .inputs
        .iter()
        .map(|input| {
            let target = target_path(input, cli.output_dir.as_deref(), converter.output_format());
            (input, target)
        })
        .collect();
    let mut claimed: HashMap<&Path, &PathBuf> = HashMap::new();
    let mut conflict = false;
    for (input, target) in &jobs {
        let Some(target) = target else { continue };
        if let Some(first) = claimed.insert(target.as_path(), *input) {
            eprintln!(
                "error: {} and {} would both be written to {}",
                first.display(),
                input.display(),
                target.display()
            );
            conflict = true;
        }
    }
    if conflict {
        return ExitCode::from(EXIT_USAGE);
    }

    if let Some(dir) = &cli.output_dir {
        if let Err(error) = fs::create_dir_all(dir) {
            eprintln!("error: cannot create {}: {error}", dir.display());
            return ExitCode::from(EXIT_FAILURE);
        }
    }

    // ファイルごとに独立した変換を並列実行
    let results: Vec<(&PathBuf, Result<PathBuf, SheetAssetError>)> = jobs
        .par_iter()
        .map(|(input, target)| (*input, convert_file(&converter, input, target.as_deref())))
        .collect();

    let mut missing = false;
    let mut failed = false;
    for (input, result) in results {
        match result {
            Ok(target) => {
                info!(input = %input.display(), output = %target.display(), "converted");
                println!("{}", target.display());
            }
            Err(error) if error.is_user_correctable() => {
                warn!(input = %input.display(), "skipped input: {error}");
                eprintln!("{}: {error}", input.display());
                missing = true;
            }
            Err(error) => {
                warn!(input = %input.display(), kind = ?error.kind(), "skipped input: {error}");
                eprintln!("{}: Could not process uploaded file: {error}", input.display());
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::from(EXIT_FAILURE)
    } else if missing {
        ExitCode::from(EXIT_USAGE)
    } else {
        ExitCode::SUCCESS
    }
}

/// `RUST_LOG`が設定されていればそれを優先し、なければ`-v`/`-q`の指定に従う
fn init_logging(verbosity: &Verbosity<WarnLevel>) {
    let filter = EnvFilter::builder()
        .with_default_directive(verbosity.tracing_level_filter().into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// CLI引数をビルダー呼び出しに対応させる
fn build_converter(cli: &Cli) -> Result<Converter, SheetAssetError> {
    let sheet_selector = match (cli.sheet_index, &cli.sheet_name) {
        (Some(index), _) => SheetSelector::Index(index),
        (None, Some(name)) => SheetSelector::Name(name.clone()),
        (None, None) => SheetSelector::First,
    };

    let date_format = match cli.date_format.as_str() {
        "iso" => DateFormat::Iso8601,
        "serial" => DateFormat::Serial,
        custom => DateFormat::Custom(custom.to_string()),
    };

    let output_format = match cli.format {
        FormatArg::Xml => OutputFormat::Xml,
        FormatArg::Json => OutputFormat::Json,
    };

    let input_format = match cli.input_format {
        InputFormatArg::Auto => InputFormat::Auto,
        InputFormatArg::Spreadsheet => InputFormat::Spreadsheet,
        InputFormatArg::Csv => InputFormat::Csv,
    };

    // 1バイトに収まらない文字はbuild()で不正な区切り文字として拒否される
    let delimiter = cli
        .delimiter
        .map(|delimiter| u8::try_from(delimiter).unwrap_or(u8::MAX));

    let mut builder = ConverterBuilder::new()
        .with_sheet_selector(sheet_selector)
        .with_input_format(input_format)
        .with_date_format(date_format)
        .with_output_format(output_format)
        .with_xml_declaration(cli.xml_declaration)
        .with_indent(cli.indent);
    if let Some(delimiter) = delimiter {
        builder = builder.with_csv_delimiter(delimiter);
    }
    if let Some(bytes) = cli.max_input_size {
        builder = builder.with_max_input_size(bytes);
    }

    builder.build()
}

/// 出力ファイルのパス（入力にファイル名がない場合は`None`）
fn target_path(input: &Path, output_dir: Option<&Path>, format: OutputFormat) -> Option<PathBuf> {
    let name = input.file_name()?.to_string_lossy().into_owned();
    let dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    Some(dir.join(output_file_name(&name, format)))
}

/// 1つの入力を変換し、書き出したファイルのパスを返す
fn convert_file(
    converter: &Converter,
    input: &Path,
    target: Option<&Path>,
) -> Result<PathBuf, SheetAssetError> {
    let document = converter.convert_path(input)?;
    let target = target.ok_or(SheetAssetError::InputMissing)?;

    let mut buffer = Vec::new();
    converter.render(&document, &mut buffer)?;
    fs::write(target, buffer)?;

    Ok(target.to_path_buf())
}
