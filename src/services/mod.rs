pub mod categories;
pub mod history;
pub mod machines;
pub mod materials;
pub mod stock_ledger;
pub mod users;

use chrono::NaiveDate;

/// Parses a `YYYY-MM` filter into a half-open date range
/// `[first of month, first of next month)`.
pub(crate) fn month_bounds(month: &str) -> Option<(NaiveDate, NaiveDate)> {
    let mut parts = month.splitn(2, '-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_bounds_cover_the_whole_month() {
        let (start, end) = month_bounds("2024-06").unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
    }

    #[test]
    fn month_bounds_roll_over_december() {
        let (start, end) = month_bounds("2023-12").unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2023, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn month_bounds_reject_garbage() {
        assert!(month_bounds("2024").is_none());
        assert!(month_bounds("2024-13").is_none());
        assert!(month_bounds("june").is_none());
    }
}
