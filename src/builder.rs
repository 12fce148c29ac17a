use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::{debug, warn};

use crate::layout::LayoutConfig;
use crate::model::{Meal, Menu};
use crate::rows::{Row, Rows};

/// A day as accumulated by [`DayBuilder`], before its date is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedDay {
    pub date: NaiveDate,
    pub menus: Vec<Menu>,
}

static DATE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"([0-9]+)\.([0-9]+)\.([0-9]{4})").ok());

/// Finds a `D.M.YYYY` date anywhere in `text`.
///
/// Returns `None` when nothing matches or when the match is not a real
/// calendar date (`31.2.2024`).
pub fn parse_header_date(text: &str) -> Option<NaiveDate> {
    let caps = DATE_PATTERN.as_ref()?.captures(text)?;

    let day = caps.get(1)?.as_str().parse::<u32>().ok()?;
    let month = caps.get(2)?.as_str().parse::<u32>().ok()?;
    let year = caps.get(3)?.as_str().parse::<i32>().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

fn looks_like_date(text: &str) -> bool {
    DATE_PATTERN.as_ref().is_some_and(|re| re.is_match(text))
}

/// Walks rows top to bottom and groups meal rows under the preceding date row.
pub struct DayBuilder<'a> {
    layout: &'a LayoutConfig,
    current_date: Option<NaiveDate>,
    current_menus: Vec<Menu>,
    completed: Vec<DatedDay>,
}

impl<'a> DayBuilder<'a> {
    pub fn new(layout: &'a LayoutConfig) -> Self {
        Self {
            layout,
            current_date: None,
            current_menus: Vec::new(),
            completed: Vec::new(),
        }
    }

    pub fn feed(&mut self, row: &Row) {
        let Some(first) = row.first_text() else {
            return;
        };

        if looks_like_date(first) {
            self.flush();
            self.current_date = parse_header_date(first);
            match self.current_date {
                Some(date) => debug!(y = row.y, %date, "date row"),
                // rows up to the next valid date are dropped like pre-date noise
                None => warn!(y = row.y, text = first, "date row is not a calendar date"),
            }
            return;
        }

        if self.current_date.is_none() {
            debug!(y = row.y, text = first, "skipping row before first date");
            return;
        }

        let menu = self.menu_from_row(row);
        debug!(y = row.y, meal_type = %menu.meal_type, meals = menu.meals.len(), "meal row");
        self.current_menus.push(menu);
    }

    fn menu_from_row(&self, row: &Row) -> Menu {
        let mut meal_type = self.layout.default_meal_type.clone();
        let mut meals = Vec::new();
        for token in &row.tokens {
            if self.layout.is_meal_type_column(token.x) {
                // Later labels in the band replace earlier ones; meals already
                // seen keep the id derived from the label current at the time.
                meal_type = token.text.clone();
            } else if self.layout.is_meal_column(token.x) {
                meals.push(Meal::new(&self.layout.parser_tag, &meal_type, &token.text));
            }
        }
        Menu { meal_type, meals }
    }

    fn flush(&mut self) {
        if self.current_menus.is_empty() {
            return;
        }
        if let Some(date) = self.current_date {
            self.completed.push(DatedDay {
                date,
                menus: std::mem::take(&mut self.current_menus),
            });
        }
    }

    pub fn finish(mut self) -> Vec<DatedDay> {
        self.flush();
        self.completed
    }
}

pub fn build_days(rows: &Rows, layout: &LayoutConfig) -> Vec<DatedDay> {
    let mut builder = DayBuilder::new(layout);
    for row in rows {
        builder.feed(row);
    }
    builder.finish()
}
