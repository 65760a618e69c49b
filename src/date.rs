//! Payment dates and actual/actual day counts.
//!
//! Payment dates follow a chain of natural due dates, each one calendar month
//! after the previous natural date. The date actually emitted is the natural
//! date rolled forward to the next business day of the loan's calendar.
//! Day counts are measured between consecutive emitted dates, the first one
//! from the loan start date.

use chrono::{Datelike, Days, NaiveDate};
use log::trace;

use crate::calendar::HolidayCalendar;

#[inline]
pub const fn is_leap(year: i32) -> bool {
    ((year % 4 == 0) && (year % 100 != 0)) || (year % 400 == 0)
}

pub const fn days_in_month(year: i32, month: u32) -> u32 {
    const COMMON: [u32; 13] = [0, 31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    if month == 2 && is_leap(year) {
        29
    } else {
        COMMON[month as usize]
    }
}

/// Number of days in the calendar year of `d`, 365 or 366.
pub fn year_length(d: NaiveDate) -> i64 {
    if is_leap(d.year()) {
        366
    } else {
        365
    }
}

/// A run of days inside one calendar year, together with that year's length.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct YearSlice {
    pub days: i64,
    pub year_length: i64,
}

impl YearSlice {
    pub fn year_fraction(&self) -> f64 {
        self.days as f64 / self.year_length as f64
    }
}

/// Elapsed days of one payment period.
///
/// A period running from a December payment date into a year of a different
/// length is kept as two slices, split at 1 January, so that each part
/// accrues over its own year.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DayCount {
    Single(YearSlice),
    Split { prior: YearSlice, next: YearSlice },
}

impl DayCount {
    /// Day count between two consecutive payment dates.
    pub fn between(earlier: NaiveDate, later: NaiveDate) -> DayCount {
        let (prior_year, next_year) = (earlier.year(), later.year());

        if earlier.month() == 12
            && prior_year != next_year
            && is_leap(prior_year) != is_leap(next_year)
        {
            let new_year = later - Days::new(later.ordinal0() as u64);
            DayCount::Split {
                prior: YearSlice {
                    days: new_year.signed_duration_since(earlier).num_days(),
                    year_length: year_length(earlier),
                },
                next: YearSlice {
                    days: later.signed_duration_since(new_year).num_days(),
                    year_length: year_length(later),
                },
            }
        } else {
            DayCount::unsplit(earlier, later)
        }
    }

    /// Whole period over the length of the later date's year. Used for the
    /// first period, measured from the loan start date.
    pub fn unsplit(earlier: NaiveDate, later: NaiveDate) -> DayCount {
        DayCount::Single(YearSlice {
            days: later.signed_duration_since(earlier).num_days(),
            year_length: year_length(later),
        })
    }

    /// Share of a year covered by the period; split periods add up their slices.
    pub fn to_year_fraction(&self) -> f64 {
        match self {
            DayCount::Single(slice) => slice.year_fraction(),
            DayCount::Split { prior, next } => prior.year_fraction() + next.year_fraction(),
        }
    }

    /// Plain number of elapsed days, as shown in the "Day" column.
    pub fn total_days(&self) -> i64 {
        match self {
            DayCount::Single(slice) => slice.days,
            DayCount::Split { prior, next } => prior.days + next.days,
        }
    }

    pub fn is_split(&self) -> bool {
        matches!(self, DayCount::Split { .. })
    }
}

/// Same day of month one calendar month later, computed as `d` plus the
/// number of days in the month of `d`.
pub fn next_natural_date(d: NaiveDate) -> NaiveDate {
    d + Days::new(days_in_month(d.year(), d.month()) as u64)
}

/// Business-day payment dates, one per month of `period`.
pub fn payment_dates(
    start_date: NaiveDate,
    period: u32,
    calendar: &dyn HolidayCalendar,
) -> Vec<NaiveDate> {
    let mut natural = start_date;
    (1..=period)
        .map(|pmt_number| {
            natural = next_natural_date(natural);
            let pmt_date = calendar.following_business_day(natural);
            trace!(
                "pmt # {}, natural date {}, payment date {}",
                pmt_number,
                natural,
                pmt_date
            );
            pmt_date
        })
        .collect()
}

/// Day counts between consecutive payment dates. The first one is measured
/// from `start_date` and is never split.
pub fn day_counts(start_date: NaiveDate, pmt_dates: &[NaiveDate]) -> Vec<DayCount> {
    let first = pmt_dates
        .first()
        .map(|&first_pmt| DayCount::unsplit(start_date, first_pmt));

    first
        .into_iter()
        .chain(
            pmt_dates
                .windows(2)
                .map(|pair| DayCount::between(pair[0], pair[1])),
        )
        .collect()
}

pub fn count_days(
    start_date: NaiveDate,
    period: u32,
    calendar: &dyn HolidayCalendar,
) -> Vec<DayCount> {
    day_counts(start_date, &payment_dates(start_date, period, calendar))
}
