//! Historical Bitcoin price series stored as semicolon separated CSV.
//!
//! Files look like this:
//!
//! ```text
//! "Date";"Price"
//! "2024-01-01";"38512,34"
//! "2024-01-02";"40102,90"
//! ```
//!
//! Prices use a comma as decimal separator. Rows are kept sorted by date and
//! each date appears once; when two sources disagree the higher price wins.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::errors::{AppError, AppResult};

const HEADER: &str = "\"Date\";\"Price\"";
const DATE_FORMAT: &str = "%Y-%m-%d";
const LEGACY_DATE_FORMATS: &[&str] = &["%d-%m-%Y", "%d/%m/%Y"];

/// One day of the series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> AppResult<Self> {
        if !price.is_finite() || price < 0.0 {
            return Err(AppError::validation(format!(
                "Price for {} must be a non-negative number",
                date
            )));
        }
        Ok(Self { date, price })
    }
}

/// Outcome of an upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Raised,
    Unchanged,
}

/// Date-indexed price series
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceHistory {
    points: BTreeMap<NaiveDate, f64>,
}

impl PriceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse CSV text. Blank lines and the header row are skipped.
    pub fn parse(input: &str) -> AppResult<Self> {
        let mut history = Self::new();

        for (index, line) in input.lines().enumerate() {
            let line = line.trim().trim_start_matches('\u{feff}');
            if line.is_empty() || is_header(line) {
                continue;
            }

            let point = parse_row(line).map_err(|e| {
                AppError::validation(format!("Line {}: {}", index + 1, e))
            })?;
            history.upsert(point);
        }

        Ok(history)
    }

    /// Insert the point, or raise the stored price if the new one is higher.
    pub fn upsert(&mut self, point: PricePoint) -> UpsertOutcome {
        match self.points.get_mut(&point.date) {
            None => {
                self.points.insert(point.date, point.price);
                UpsertOutcome::Inserted
            }
            Some(existing) if point.price > *existing => {
                *existing = point.price;
                UpsertOutcome::Raised
            }
            Some(_) => UpsertOutcome::Unchanged,
        }
    }

    /// Upsert every point of `other`.
    pub fn merge(&mut self, other: &PriceHistory) -> usize {
        other
            .iter()
            .map(|point| self.upsert(point))
            .filter(|outcome| *outcome != UpsertOutcome::Unchanged)
            .count()
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points.get(&date).copied()
    }

    /// Points in ascending date order
    pub fn iter(&self) -> impl Iterator<Item = PricePoint> + '_ {
        self.points
            .iter()
            .map(|(date, price)| PricePoint { date: *date, price: *price })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<PricePoint> {
        self.iter().next()
    }

    pub fn last(&self) -> Option<PricePoint> {
        self.points
            .iter()
            .next_back()
            .map(|(date, price)| PricePoint { date: *date, price: *price })
    }

    /// Serialize to CSV with ISO dates and two decimals.
    pub fn to_csv(&self) -> String {
        let mut out = String::with_capacity(32 * (self.points.len() + 1));
        out.push_str(HEADER);
        out.push('\n');
        for point in self.iter() {
            out.push_str(&format!(
                "\"{}\";\"{}\"\n",
                point.date.format(DATE_FORMAT),
                format_price(point.price)
            ));
        }
        out
    }
}

impl FromIterator<PricePoint> for PriceHistory {
    fn from_iter<I: IntoIterator<Item = PricePoint>>(iter: I) -> Self {
        let mut history = Self::new();
        for point in iter {
            history.upsert(point);
        }
        history
    }
}

fn is_header(line: &str) -> bool {
    line.split(';')
        .next()
        .map(|cell| unquote(cell).eq_ignore_ascii_case("date"))
        .unwrap_or(false)
}

fn unquote(cell: &str) -> &str {
    let cell = cell.trim();
    cell.strip_prefix('"')
        .and_then(|c| c.strip_suffix('"'))
        .unwrap_or(cell)
        .trim()
}

fn parse_row(line: &str) -> Result<PricePoint, String> {
    let mut cells = line.split(';');
    let date = cells.next().map(unquote).ok_or("missing date")?;
    let price = cells.next().map(unquote).ok_or("missing price")?;
    if cells.next().is_some() {
        return Err("expected two columns".to_string());
    }

    let date = parse_date(date)?;
    let price = parse_price(price)?;
    PricePoint::new(date, price).map_err(|e| e.to_string())
}

/// Accepts `YYYY-MM-DD` and the older `DD-MM-YYYY` / `DD/MM/YYYY` layouts.
pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    std::iter::once(DATE_FORMAT)
        .chain(LEGACY_DATE_FORMATS.iter().copied())
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .ok_or_else(|| format!("invalid date '{}'", value))
}

/// Parse a price written with a comma decimal separator.
/// Dots are treated as thousands separators when a comma is present.
pub fn parse_price(value: &str) -> Result<f64, String> {
    let normalized = if value.contains(',') {
        value.replace('.', "").replace(',', ".")
    } else {
        value.to_string()
    };
    normalized
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid price '{}'", value))
}

/// Format with two decimals and a comma separator.
pub fn format_price(price: f64) -> String {
    format!("{:.2}", price).replace('.', ",")
}
