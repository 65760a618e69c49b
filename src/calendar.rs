use chrono::{Datelike, Days, NaiveDate, Weekday};

const ONE_DAY: Days = Days::new(1);

/// Source of business days for payment date adjustment.
pub trait HolidayCalendar: Send + Sync {
    /// True for weekends and public holidays.
    fn is_holiday(&self, d: NaiveDate) -> bool;

    fn is_business_day(&self, d: NaiveDate) -> bool {
        !self.is_holiday(d)
    }

    /// Rolls `d` forward one day at a time until it is a business day.
    /// A business day is returned unchanged.
    fn following_business_day(&self, mut d: NaiveDate) -> NaiveDate {
        while self.is_holiday(d) {
            d = d + ONE_DAY;
        }
        d
    }
}

#[derive(Clone, Copy, Debug)]
struct FixedDateHoliday {
    month: u32,
    day: u32,
    first_year: i32,
    last_year: i32,
}

const fn holiday(month: u32, day: u32, first_year: i32, last_year: i32) -> FixedDateHoliday {
    FixedDateHoliday {
        month,
        day,
        first_year,
        last_year,
    }
}

impl FixedDateHoliday {
    fn falls_on(&self, d: NaiveDate) -> bool {
        self.month == d.month()
            && self.day == d.day()
            && (self.first_year..=self.last_year).contains(&d.year())
    }
}

const SINCE_EVER: i32 = i32::MIN;
const ONGOING: i32 = i32::MAX;

// Public holidays of the Russian Federation that fall on a fixed date.
const RUSSIAN_HOLIDAYS: [FixedDateHoliday; 18] = [
    holiday(1, 1, SINCE_EVER, ONGOING),
    holiday(1, 2, SINCE_EVER, ONGOING),
    holiday(1, 3, 2005, ONGOING),
    holiday(1, 4, 2005, ONGOING),
    holiday(1, 5, 2005, ONGOING),
    holiday(1, 6, 2013, ONGOING),
    holiday(1, 7, SINCE_EVER, ONGOING),
    holiday(1, 8, 2013, ONGOING),
    holiday(2, 23, 2002, ONGOING),
    holiday(3, 8, SINCE_EVER, ONGOING),
    holiday(5, 1, SINCE_EVER, ONGOING),
    holiday(5, 2, SINCE_EVER, 2004),
    holiday(5, 9, SINCE_EVER, ONGOING),
    holiday(6, 12, 1992, ONGOING),
    holiday(11, 4, 2005, ONGOING),
    holiday(11, 7, SINCE_EVER, 2004),
    holiday(11, 8, SINCE_EVER, 1996),
    holiday(12, 12, 1994, 2004),
];

/// The national calendar used for every loan unless another one is injected:
/// Saturday and Sunday weekends plus the fixed-date public holidays of Russia.
#[derive(Clone, Copy, Debug, Default)]
pub struct RussianCalendar;

impl RussianCalendar {
    pub fn new() -> Self {
        Self
    }

    pub fn is_weekend(&self, d: NaiveDate) -> bool {
        matches!(d.weekday(), Weekday::Sat | Weekday::Sun)
    }

    pub fn is_public_holiday(&self, d: NaiveDate) -> bool {
        RUSSIAN_HOLIDAYS.iter().any(|h| h.falls_on(d))
    }
}

impl HolidayCalendar for RussianCalendar {
    fn is_holiday(&self, d: NaiveDate) -> bool {
        self.is_weekend(d) || self.is_public_holiday(d)
    }
}

#[cfg(test)]
mod tests {
    use super::{HolidayCalendar, RussianCalendar};
    use chrono::NaiveDate;
    use test_log::test;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weekends() {
        let cal = RussianCalendar::new();
        assert!(cal.is_holiday(ymd(2021, 7, 31)));
        assert!(cal.is_holiday(ymd(2021, 8, 1)));
        assert!(cal.is_business_day(ymd(2021, 8, 2)));
    }

    #[test]
    fn test_public_holidays() {
        let cal = RussianCalendar::new();
        for d in [
            ymd(2021, 1, 1),
            ymd(2021, 1, 7),
            ymd(2021, 1, 8),
            ymd(2022, 2, 23),
            ymd(2022, 3, 8),
            ymd(2023, 5, 1),
            ymd(2023, 5, 9),
            ymd(2023, 6, 12),
            ymd(2023, 11, 4),
        ] {
            assert!(cal.is_public_holiday(d), "{} should be a holiday", d);
        }
        assert!(!cal.is_public_holiday(ymd(2023, 11, 7)));
        assert!(cal.is_public_holiday(ymd(2003, 11, 7)));
        assert!(!cal.is_public_holiday(ymd(2010, 1, 8)));
        assert!(!cal.is_public_holiday(ymd(2001, 2, 23)));
    }

    #[test]
    fn test_holidays_abolished_in_2005() {
        let cal = RussianCalendar::new();
        for d in [ymd(2004, 5, 2), ymd(2004, 12, 12), ymd(1996, 11, 8), ymd(1994, 12, 12)] {
            assert!(cal.is_public_holiday(d), "{} should be a holiday", d);
        }
        for d in [ymd(2005, 5, 2), ymd(2005, 12, 12), ymd(1997, 11, 8), ymd(1993, 12, 12)] {
            assert!(!cal.is_public_holiday(d), "{} should not be a holiday", d);
        }
        // monday 2 may 2004 rolls to tuesday
        assert_eq!(cal.following_business_day(ymd(2004, 5, 1)), ymd(2004, 5, 4));
    }

    #[test]
    fn test_following_business_day() {
        let cal = RussianCalendar::new();
        // saturday
        assert_eq!(cal.following_business_day(ymd(2021, 7, 31)), ymd(2021, 8, 2));
        // business day is left alone
        assert_eq!(cal.following_business_day(ymd(2021, 12, 31)), ymd(2021, 12, 31));
        // holiday on a wednesday
        assert_eq!(cal.following_business_day(ymd(2022, 2, 23)), ymd(2022, 2, 24));
        // new year holidays followed by a weekend
        assert_eq!(cal.following_business_day(ymd(2022, 1, 1)), ymd(2022, 1, 10));
    }
}
