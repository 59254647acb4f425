use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::db::DaoError;
use crate::ledger::SpendingAggregator;
use crate::models::spending::SpendingByWeek;

pub const WEEKLY_REPORT_SHEET: &str = "Weekly Report";

const WEEK_HEADER: &str = "Week";
const TOTAL_HEADER: &str = "Total Spending";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Excel,
    Pdf,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Excel => "xlsx",
            ReportFormat::Pdf => "pdf",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "text/csv",
            ReportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ReportFormat::Pdf => "application/pdf",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ReportFormat::Csv),
            "excel" | "xlsx" => Ok(ReportFormat::Excel),
            "pdf" => Ok(ReportFormat::Pdf),
            _ => Err(ExportError::UnsupportedFormat(String::from(s))),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

#[derive(Debug)]
pub enum ExportError {
    UnsupportedFormat(String),
    UnimplementedFormat(ReportFormat),
    InvalidWeekCount(u32),
    Persistence(DaoError),
    Rendering(String),
}

impl std::error::Error for ExportError {}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::UnsupportedFormat(format) => {
                write!(f, "ExportError: Unsupported report format '{format}'")
            }
            ExportError::UnimplementedFormat(format) => {
                write!(f, "ExportError: Report format '{format}' is not available yet")
            }
            ExportError::InvalidWeekCount(weeks) => {
                write!(f, "ExportError: Week count must be at least 1, got {weeks}")
            }
            ExportError::Persistence(e) => write!(f, "ExportError: {e}"),
            ExportError::Rendering(msg) => {
                write!(f, "ExportError: Failed to render report: {msg}")
            }
        }
    }
}

impl From<DaoError> for ExportError {
    fn from(error: DaoError) -> Self {
        ExportError::Persistence(error)
    }
}

impl From<csv::Error> for ExportError {
    fn from(error: csv::Error) -> Self {
        ExportError::Rendering(error.to_string())
    }
}

impl From<XlsxError> for ExportError {
    fn from(error: XlsxError) -> Self {
        ExportError::Rendering(error.to_string())
    }
}

#[derive(Clone, Debug)]
pub struct ReportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

pub async fn export_weekly_report(
    aggregator: &dyn SpendingAggregator,
    user_id: i32,
    format: ReportFormat,
    number_of_weeks: u32,
    today: NaiveDate,
) -> Result<ReportFile, ExportError> {
    if number_of_weeks == 0 {
        return Err(ExportError::InvalidWeekCount(number_of_weeks));
    }

    let render: fn(&[SpendingByWeek]) -> Result<Vec<u8>, ExportError> = match format {
        ReportFormat::Csv => render_csv,
        ReportFormat::Excel => render_xlsx,
        ReportFormat::Pdf => return Err(ExportError::UnimplementedFormat(format)),
    };

    let weeks = aggregator
        .spending_by_week(user_id, number_of_weeks, today)
        .await?;

    let bytes = render(&weeks)?;

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    Ok(ReportFile {
        file_name: format!("weekly_report_{timestamp}.{}", format.extension()),
        content_type: format.content_type(),
        bytes,
    })
}

fn render_csv(weeks: &[SpendingByWeek]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record([WEEK_HEADER, TOTAL_HEADER])?;
    for week in weeks {
        let total = format!("{:.2}", week.total);
        writer.write_record([week.week_label.as_str(), total.as_str()])?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Rendering(e.to_string()))
}

/// One sheet with a bold header row, week labels as text and totals as numbers.
fn render_xlsx(weeks: &[SpendingByWeek]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let total_format = Format::new().set_num_format("#,##0.00");

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(WEEKLY_REPORT_SHEET)?;
    worksheet.write_string_with_format(0, 0, WEEK_HEADER, &header_format)?;
    worksheet.write_string_with_format(0, 1, TOTAL_HEADER, &header_format)?;

    for (row, week) in (1u32..).zip(weeks) {
        worksheet.write_string(row, 0, week.week_label.as_str())?;
        worksheet.write_number_with_format(row, 1, week.total, &total_format)?;
    }

    Ok(workbook.save_to_buffer()?)
}
