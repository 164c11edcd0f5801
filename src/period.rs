use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PeriodError {
    #[error("Invalid month {month} for year {year}")]
    InvalidMonth { year: i32, month: u32 },
    #[error("Period start {start} is after end {end}")]
    StartAfterEnd { start: NaiveDate, end: NaiveDate },
}

/// Inclusive date range that allocation records are keyed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, PeriodError> {
        if start > end {
            return Err(PeriodError::StartAfterEnd { start, end });
        }
        Ok(Self { start, end })
    }

    /// First and last day of the given calendar month
    pub fn from_year_month(year: i32, month: u32) -> Result<Self, PeriodError> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or(PeriodError::InvalidMonth { year, month })?;
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or(PeriodError::InvalidMonth { year, month })?;
        let end = next_month
            .pred_opt()
            .ok_or(PeriodError::InvalidMonth { year, month })?;

        Ok(Self { start, end })
    }

    /// Number of days in the period, both ends included
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Days shared with another period, zero when disjoint
    pub fn overlap_days(&self, other: &Period) -> i64 {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start > end {
            0
        } else {
            (end - start).num_days() + 1
        }
    }

    pub fn year(&self) -> i32 {
        self.start.year()
    }

    pub fn month(&self) -> u32 {
        self.start.month()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_from_year_month() {
        let period = Period::from_year_month(2024, 2).unwrap();
        assert_eq!(period.start, date(2024, 2, 1));
        assert_eq!(period.end, date(2024, 2, 29));
        assert_eq!(period.days(), 29);

        let december = Period::from_year_month(2023, 12).unwrap();
        assert_eq!(december.end, date(2023, 12, 31));
        assert_eq!(december.days(), 31);
    }

    #[test]
    fn test_invalid_month() {
        assert_eq!(
            Period::from_year_month(2024, 13),
            Err(PeriodError::InvalidMonth {
                year: 2024,
                month: 13
            })
        );
        assert!(Period::from_year_month(2024, 0).is_err());
    }

    #[test]
    fn test_new_rejects_reversed_range() {
        assert!(Period::new(date(2024, 3, 2), date(2024, 3, 1)).is_err());
        assert!(Period::new(date(2024, 3, 1), date(2024, 3, 1)).is_ok());
    }

    #[test]
    fn test_overlap_days() {
        let march = Period::from_year_month(2024, 3).unwrap();
        let mid = Period::new(date(2024, 3, 20), date(2024, 4, 10)).unwrap();
        let april = Period::from_year_month(2024, 4).unwrap();

        assert_eq!(march.overlap_days(&mid), 12);
        assert_eq!(mid.overlap_days(&march), 12);
        assert_eq!(march.overlap_days(&april), 0);
        assert_eq!(march.overlap_days(&march), 31);
    }

    #[test]
    fn test_contains() {
        let march = Period::from_year_month(2024, 3).unwrap();
        assert!(march.contains(date(2024, 3, 1)));
        assert!(march.contains(date(2024, 3, 31)));
        assert!(!march.contains(date(2024, 4, 1)));
    }
}
