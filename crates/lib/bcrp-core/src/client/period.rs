//! Date handling for API requests and period labels in responses.

use bcrp_store::Frequency;
use chrono::{Datelike, Months, NaiveDate};

use super::ClientError;

/// Start and end bounds supplied by a caller, before API formatting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeriodRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl PeriodRange {
    #[must_use]
    pub fn new(start: Option<&str>, end: Option<&str>) -> Self {
        Self {
            start: non_empty(start),
            end: non_empty(end),
        }
    }

    /// Parses a tool-level period argument.
    ///
    /// `A/B` gives both bounds, a bare four-digit year spans January to
    /// December, and anything else is taken as the start only.
    ///
    /// # Errors
    /// Returns `ClientError::InvalidInput` when the argument has more than one
    /// `/` separator.
    pub fn parse(period: Option<&str>) -> Result<Self, ClientError> {
        let Some(period) = period.map(str::trim).filter(|p| !p.is_empty()) else {
            return Ok(Self::default());
        };

        let parts: Vec<&str> = period.split('/').collect();
        match parts.as_slice() {
            [start, end] => Ok(Self::new(Some(*start), Some(*end))),
            [year] if year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()) => Ok(Self {
                start: Some(format!("{year}-01")),
                end: Some(format!("{year}-12")),
            }),
            [single] => Ok(Self::new(Some(*single), None)),
            _ => Err(ClientError::InvalidInput(format!(
                "period must be START/END, YYYY or a single date, got {period}"
            ))),
        }
    }

    /// Formats the bounds for the series URL, returning `None` when no start
    /// is set. A start without an end requests that single period.
    ///
    /// # Errors
    /// Returns `ClientError::InvalidInput` when a date part is not numeric.
    pub fn to_api_bounds(
        &self,
        frequency: Frequency,
    ) -> Result<Option<(String, String)>, ClientError> {
        let Some(start) = self.start.as_deref() else {
            return Ok(None);
        };
        let start_fmt = format_api_date(start, frequency)?;

        let end_fmt = match self.end.as_deref() {
            None => return Ok(Some((start_fmt.clone(), start_fmt))),
            Some(end) if frequency == Frequency::Daily && end.split('-').count() == 2 => {
                month_end(end)?
            }
            Some(end) => format_api_date(end, frequency)?,
        };
        Ok(Some((start_fmt, end_fmt)))
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Formats `YYYY-MM[-DD]` the way the API expects for `frequency`: daily
/// dates become `YYYY-M-D` (day 1 when absent), others `YYYY-M`. Inputs with
/// a single part pass through unchanged.
///
/// # Errors
/// Returns `ClientError::InvalidInput` when the month or day is not numeric.
pub fn format_api_date(date: &str, frequency: Frequency) -> Result<String, ClientError> {
    let parts: Vec<&str> = date.trim().split('-').collect();
    match (frequency, parts.as_slice()) {
        (Frequency::Daily, [year, month]) => Ok(format!("{year}-{}-1", number(month, date)?)),
        (Frequency::Daily, [year, month, day]) => Ok(format!(
            "{year}-{}-{}",
            number(month, date)?,
            number(day, date)?
        )),
        (Frequency::Daily, _) => Ok(date.trim().to_string()),
        (_, [year, month, ..]) => Ok(format!("{year}-{}", number(month, date)?)),
        _ => Ok(date.trim().to_string()),
    }
}

/// Expands `YYYY-MM` to the last day of that month as `YYYY-M-D`.
///
/// # Errors
/// Returns `ClientError::InvalidInput` for anything that is not a valid
/// year and month.
pub fn month_end(date: &str) -> Result<String, ClientError> {
    let invalid = || ClientError::InvalidInput(format!("not a YYYY-MM month: {date}"));
    let (year, month) = date.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.trim().parse().map_err(|_| invalid())?;
    let month = number(month, date)?;
    let last = NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next| next.pred_opt())
        .ok_or_else(invalid)?;
    Ok(format!("{}-{}-{}", last.year(), last.month(), last.day()))
}

fn number(part: &str, date: &str) -> Result<u32, ClientError> {
    part.trim()
        .parse()
        .map_err(|_| ClientError::InvalidInput(format!("invalid date component in {date}")))
}

const MONTHS: &[(&str, u32)] = &[
    ("ene", 1),
    ("jan", 1),
    ("feb", 2),
    ("mar", 3),
    ("abr", 4),
    ("apr", 4),
    ("may", 5),
    ("jun", 6),
    ("jul", 7),
    ("ago", 8),
    ("aug", 8),
    ("sep", 9),
    ("set", 9),
    ("oct", 10),
    ("nov", 11),
    ("dic", 12),
    ("dec", 12),
];

fn month_number(abbr: &str) -> Option<u32> {
    let abbr = abbr.trim().to_ascii_lowercase();
    MONTHS
        .iter()
        .find(|(name, _)| abbr.starts_with(name))
        .map(|(_, month)| *month)
}

fn full_year(year: &str) -> Option<i32> {
    let value: i32 = year.trim().parse().ok()?;
    match year.trim().len() {
        4 => Some(value),
        2 if value < 69 => Some(2000 + value),
        2 => Some(1900 + value),
        _ => None,
    }
}

/// Parses a period label as published by the API into its first day.
///
/// Handles monthly `Ene.2024`, daily `02.Ene.24`, quarterly `T1.24` and
/// annual `2024` labels.
#[must_use]
pub fn parse_period_label(label: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = label.trim().split('.').collect();
    match parts.as_slice() {
        [year] => NaiveDate::from_ymd_opt(full_year(year)?, 1, 1),
        [quarter, year] if quarter.starts_with(['T', 't']) => {
            let quarter: u32 = quarter[1..].parse().ok()?;
            if !(1..=4).contains(&quarter) {
                return None;
            }
            NaiveDate::from_ymd_opt(full_year(year)?, (quarter - 1) * 3 + 1, 1)
        }
        [month, year] => NaiveDate::from_ymd_opt(full_year(year)?, month_number(month)?, 1),
        [day, month, year] => NaiveDate::from_ymd_opt(
            full_year(year)?,
            month_number(month)?,
            day.trim().parse().ok()?,
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: &str, end: &str) -> PeriodRange {
        PeriodRange::new(Some(start), Some(end))
    }

    #[test]
    fn parses_period_arguments() {
        assert_eq!(
            PeriodRange::parse(Some("2023-01/2023-06")).expect("range"),
            range("2023-01", "2023-06")
        );
        assert_eq!(
            PeriodRange::parse(Some("2024")).expect("year"),
            range("2024-01", "2024-12")
        );
        assert_eq!(
            PeriodRange::parse(Some("2024-03")).expect("single"),
            PeriodRange::new(Some("2024-03"), None)
        );
        assert_eq!(PeriodRange::parse(None).expect("none"), PeriodRange::default());
        assert_eq!(PeriodRange::parse(Some("  ")).expect("blank"), PeriodRange::default());
        assert!(PeriodRange::parse(Some("a/b/c")).is_err());
    }

    #[test]
    fn formats_dates_per_frequency() {
        assert_eq!(format_api_date("2024-01", Frequency::Daily).expect("d"), "2024-1-1");
        assert_eq!(format_api_date("2024-01-05", Frequency::Daily).expect("d"), "2024-1-5");
        assert_eq!(format_api_date("2024-03", Frequency::Monthly).expect("m"), "2024-3");
        assert_eq!(format_api_date("2024-03-15", Frequency::Quarterly).expect("q"), "2024-3");
        assert_eq!(format_api_date("2024", Frequency::Annual).expect("a"), "2024");
        assert!(format_api_date("2024-xx", Frequency::Monthly).is_err());
    }

    #[test]
    fn daily_end_month_expands_to_last_day() {
        let bounds = range("2024-01", "2024-02")
            .to_api_bounds(Frequency::Daily)
            .expect("bounds");
        assert_eq!(bounds, Some(("2024-1-1".to_string(), "2024-2-29".to_string())));

        let bounds = range("2023-11", "2023-12")
            .to_api_bounds(Frequency::Monthly)
            .expect("bounds");
        assert_eq!(bounds, Some(("2023-11".to_string(), "2023-12".to_string())));
    }

    #[test]
    fn start_only_requests_single_period() {
        let bounds = PeriodRange::new(Some("2024-05"), None)
            .to_api_bounds(Frequency::Monthly)
            .expect("bounds");
        assert_eq!(bounds, Some(("2024-5".to_string(), "2024-5".to_string())));

        let none = PeriodRange::new(None, Some("2024-05"))
            .to_api_bounds(Frequency::Monthly)
            .expect("bounds");
        assert_eq!(none, None);
    }

    #[test]
    fn month_end_handles_december_and_bad_input() {
        assert_eq!(month_end("2023-12").expect("dec"), "2023-12-31");
        assert!(month_end("2023-13").is_err());
        assert!(month_end("2023").is_err());
    }

    #[test]
    fn parses_spanish_period_labels() {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).expect("valid date");
        assert_eq!(parse_period_label("Ene.2024"), Some(date(2024, 1, 1)));
        assert_eq!(parse_period_label("Dic.2023"), Some(date(2023, 12, 1)));
        assert_eq!(parse_period_label("02.Ene.24"), Some(date(2024, 1, 2)));
        assert_eq!(parse_period_label("T3.24"), Some(date(2024, 7, 1)));
        assert_eq!(parse_period_label("2019"), Some(date(2019, 1, 1)));
        assert_eq!(parse_period_label("Foo.2024"), None);
        assert_eq!(parse_period_label("T5.24"), None);
    }
}
