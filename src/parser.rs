use chrono::{Datelike, NaiveDate};
use tracing::{error, info};

use crate::builder::{DatedDay, build_days};
use crate::error::MenuError;
use crate::extract::collect_rows;
use crate::layout::LayoutConfig;
use crate::legend::legend_from_rows;
use crate::model::{Day, Token, WeeklyMenu};
use crate::rows::{RowCollector, Rows};

pub fn format_date(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Orders days chronologically (stable for equal dates) and renders their dates.
pub fn sort_and_format(mut days: Vec<DatedDay>) -> Vec<Day> {
    days.sort_by_key(|day| day.date);
    days.into_iter()
        .map(|day| Day {
            date: format_date(day.date),
            menus: day.menus,
        })
        .collect()
}

pub fn parse_rows(rows: &Rows, layout: &LayoutConfig) -> WeeklyMenu {
    let days = sort_and_format(build_days(rows, layout));
    let diets = legend_from_rows(rows);
    WeeklyMenu { days, diets }
}

/// Parses an already extracted token stream. Cannot fail.
pub fn parse_tokens<I>(tokens: I, layout: &LayoutConfig) -> WeeklyMenu
where
    I: IntoIterator<Item = Token>,
{
    let rows = tokens.into_iter().collect::<RowCollector>().finish();
    parse_rows(&rows, layout)
}

/// Decodes a menu PDF and parses it.
///
/// `Err` means the document itself could not be decoded; an `Ok` with no
/// days is a valid, empty menu.
pub fn parse_document(bytes: &[u8], layout: &LayoutConfig) -> Result<WeeklyMenu, MenuError> {
    let rows = collect_rows(bytes).inspect_err(|err| error!(%err, "menu document rejected"))?;
    let menu = parse_rows(&rows, layout);
    info!(
        rows = rows.len(),
        days = menu.days.len(),
        diets = menu.diets.len(),
        "parsed menu document"
    );
    Ok(menu)
}
