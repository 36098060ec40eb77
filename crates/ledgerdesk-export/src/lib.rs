//! `.xlsx` export of general ledgers and general balances
//!
//! Builders return the workbook bytes; [`save_to`] writes them under the
//! configured output directory.

pub mod balance;
pub mod error;
pub mod ledger;

use std::fs;
use std::path::{Path, PathBuf};

use ledgerdesk_config::ExportConfig;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Worksheet};

pub use balance::{general_balance_workbook, AssetBlocks};
pub use error::{ExportError, ExportResult};
pub use ledger::ledger_workbook;

/// Label used in place of a project name for consolidated exports
pub const ALL_PROJECTS: &str = "ALL PROJECTS";

const TITLE_FILL: u32 = 0x4CAF50;
const ACCOUNT_TITLE_FILL: u32 = 0x009688;
const HEADER_FILL: u32 = 0x1976D2;
const TOTAL_FILL: u32 = 0x455A64;
const GRAND_TOTAL_FILL: u32 = 0x263238;
const GRID_COLOR: u32 = 0xBDBDBD;

#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub right_to_left: bool,
    pub number_format: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            right_to_left: false,
            number_format: "#,##0.00".to_string(),
        }
    }
}

impl ExportOptions {
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            right_to_left: config.right_to_left,
            number_format: config.number_format.clone(),
        }
    }
}

pub fn ledger_file_name(project: &str) -> String {
    format!("General Ledger - {}.xlsx", project)
}

pub fn balance_file_name(project: &str) -> String {
    format!("General Balance - {}.xlsx", project)
}

/// Write workbook bytes to `dir/file_name`, creating `dir` if needed
pub fn save_to(dir: &Path, file_name: &str, bytes: &[u8]) -> ExportResult<PathBuf> {
    let path = dir.join(file_name);
    let io_error = |source| ExportError::Write {
        path: path.display().to_string(),
        source,
    };
    fs::create_dir_all(dir).map_err(io_error)?;
    fs::write(&path, bytes).map_err(io_error)?;
    log::info!("wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}

pub(crate) fn num(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Cell formats shared by every sheet of a workbook
pub(crate) struct Styles {
    pub title: Format,
    pub account_title: Format,
    pub header: Format,
    pub text: Format,
    pub amount: Format,
    pub bold: Format,
    pub bold_amount: Format,
    pub total: Format,
    pub total_amount: Format,
    pub grand_total: Format,
    pub grand_total_amount: Format,
}

impl Styles {
    pub fn new(options: &ExportOptions) -> Self {
        let banner = |fill: u32, size: f64| {
            Format::new()
                .set_bold()
                .set_font_size(size)
                .set_font_color(Color::White)
                .set_background_color(Color::RGB(fill))
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
        };
        let bordered = || {
            Format::new()
                .set_align(FormatAlign::Center)
                .set_border(FormatBorder::Thin)
                .set_border_color(Color::RGB(GRID_COLOR))
        };
        let filled = |fill: u32| {
            Format::new()
                .set_bold()
                .set_font_color(Color::White)
                .set_background_color(Color::RGB(fill))
                .set_align(FormatAlign::Center)
        };
        let amount_format = options.number_format.as_str();

        Self {
            title: banner(TITLE_FILL, 18.0),
            account_title: banner(ACCOUNT_TITLE_FILL, 16.0),
            header: filled(HEADER_FILL),
            text: bordered(),
            amount: bordered().set_num_format(amount_format),
            bold: bordered().set_bold(),
            bold_amount: bordered().set_bold().set_num_format(amount_format),
            total: filled(TOTAL_FILL),
            total_amount: filled(TOTAL_FILL).set_num_format(amount_format),
            grand_total: filled(GRAND_TOTAL_FILL).set_font_size(13),
            grand_total_amount: filled(GRAND_TOTAL_FILL)
                .set_font_size(13)
                .set_num_format(amount_format),
        }
    }
}

/// Fresh worksheet with the workbook's reading direction
pub(crate) fn new_sheet(name: &str, options: &ExportOptions) -> ExportResult<Worksheet> {
    let mut sheet = Worksheet::new();
    sheet.set_name(name)?;
    sheet.set_right_to_left(options.right_to_left);
    Ok(sheet)
}
