use chrono::{Datelike, NaiveDate};
use log::debug;
use std::{fmt, sync::Arc};

use crate::amortization::{self, Amortization, Method};
use crate::calendar::{HolidayCalendar, RussianCalendar};
use crate::date::{self, DayCount};
use crate::error::ValidationError;

/// Longest accepted loan term, in months.
pub const MAX_PERIOD: i64 = 1200;

/// Column headers of a payment schedule, in `PaymentRecord` field order.
pub const HEADERS: [&str; 6] = ["Date", "Day", "Principal", "Interest", "Payment", "Balance"];

const MIN_START_YEAR: i32 = 1900;
const MAX_START_YEAR: i32 = 9999;

/// Accepted representations of a loan start date.
pub trait IntoStartDate {
    fn into_start_date(self) -> Result<NaiveDate, ValidationError>;
}

impl IntoStartDate for NaiveDate {
    fn into_start_date(self) -> Result<NaiveDate, ValidationError> {
        if (MIN_START_YEAR..=MAX_START_YEAR).contains(&self.year()) {
            Ok(self)
        } else {
            Err(ValidationError::StartDate(self.to_string()))
        }
    }
}

impl IntoStartDate for &str {
    fn into_start_date(self) -> Result<NaiveDate, ValidationError> {
        parse_start_date(self)
    }
}

impl IntoStartDate for String {
    fn into_start_date(self) -> Result<NaiveDate, ValidationError> {
        parse_start_date(&self)
    }
}

/// Parses an ISO-8601 calendar date (`yyyy-mm-dd`).
pub fn parse_start_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::StartDate(s.to_string()))?
        .into_start_date()
}

fn validate_amount(amount: f64) -> Result<f64, ValidationError> {
    if amount.is_finite() && amount > 0. {
        Ok(amount)
    } else {
        Err(ValidationError::Amount(amount))
    }
}

fn validate_period(period: i64) -> Result<u32, ValidationError> {
    if (1..=MAX_PERIOD).contains(&period) {
        Ok(period as u32)
    } else {
        Err(ValidationError::Period(period))
    }
}

fn validate_rate(annual_rate: f64) -> Result<f64, ValidationError> {
    if annual_rate.is_finite() && annual_rate > 0. {
        Ok(annual_rate)
    } else {
        Err(ValidationError::Rate(annual_rate))
    }
}

/// Validated terms of a loan.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LoanParameters {
    amount: f64,
    period: u32,
    annual_rate: f64,
    start_date: NaiveDate,
}

impl LoanParameters {
    /// `annual_rate` is a percentage (20.0 for 20%), `period` is in months.
    pub fn new(
        amount: f64,
        period: i64,
        annual_rate: f64,
        start_date: impl IntoStartDate,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            amount: validate_amount(amount)?,
            period: validate_period(period)?,
            annual_rate: validate_rate(annual_rate)?,
            start_date: start_date.into_start_date()?,
        })
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    pub fn rate(&self) -> f64 {
        self.annual_rate
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn set_amount(&mut self, amount: f64) -> Result<(), ValidationError> {
        self.amount = validate_amount(amount)?;
        Ok(())
    }

    pub fn set_period(&mut self, period: i64) -> Result<(), ValidationError> {
        self.period = validate_period(period)?;
        Ok(())
    }

    pub fn set_rate(&mut self, annual_rate: f64) -> Result<(), ValidationError> {
        self.annual_rate = validate_rate(annual_rate)?;
        Ok(())
    }

    pub fn set_start_date(&mut self, start_date: impl IntoStartDate) -> Result<(), ValidationError> {
        self.start_date = start_date.into_start_date()?;
        Ok(())
    }
}

/// One line of a payment schedule.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaymentRecord {
    pub date: NaiveDate,
    pub days: i64,
    pub principal: f64,
    pub interest: f64,
    pub payment: f64,
    pub balance: f64,
}

impl fmt::Display for PaymentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "date {}, days {}, principal {:.2}, interest {:.2}, payment {:.2}, ending balance {:.2}",
            self.date, self.days, self.principal, self.interest, self.payment, self.balance
        )
    }
}

/// A loan of a given repayment method, ready to produce its schedule.
#[derive(Clone)]
pub struct Loan {
    method: Method,
    params: LoanParameters,
    calendar: Arc<dyn HolidayCalendar>,
}

impl Loan {
    pub fn new(method: Method, params: LoanParameters) -> Self {
        Self::with_calendar(method, params, Arc::new(RussianCalendar::new()))
    }

    pub fn with_calendar(
        method: Method,
        params: LoanParameters,
        calendar: Arc<dyn HolidayCalendar>,
    ) -> Self {
        debug!(
            "new {} loan: amount {}, rate {}%, period {} months, start {}",
            method,
            params.amount(),
            params.rate(),
            params.period(),
            params.start_date()
        );
        Self {
            method,
            params,
            calendar,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn params(&self) -> &LoanParameters {
        &self.params
    }

    /// Constant payment of an annuity loan; `None` for straight-line loans.
    pub fn annuity_payment(&self) -> Option<f64> {
        match self.method {
            Method::Annuity => Some(amortization::annuity_payment(
                self.params.amount(),
                self.params.period(),
                self.params.rate(),
            )),
            Method::StraightLine => None,
        }
    }

    pub fn payment_dates(&self) -> Vec<NaiveDate> {
        date::payment_dates(
            self.params.start_date(),
            self.params.period(),
            self.calendar.as_ref(),
        )
    }

    pub fn day_counts(&self) -> Vec<DayCount> {
        date::count_days(
            self.params.start_date(),
            self.params.period(),
            self.calendar.as_ref(),
        )
    }

    /// Fresh amortization rows, recomputed from the loan parameters on every call.
    pub fn amortize(&self) -> Amortization {
        Amortization::new(self.method, &self.params, self.day_counts())
    }

    /// Fresh payment schedule, recomputed from the loan parameters on every call.
    pub fn schedule(&self) -> Schedule {
        let pmt_dates = self.payment_dates();
        let day_counts = date::day_counts(self.params.start_date(), &pmt_dates);
        let days = day_counts.iter().map(DayCount::total_days).collect();
        let amortization = Amortization::new(self.method, &self.params, day_counts);
        Schedule::new(pmt_dates, days, amortization)
    }
}

impl fmt::Debug for Loan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loan")
            .field("method", &self.method)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Loan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} loan, amount {}, rate {}%, period {} months, start {}",
            self.method,
            self.params.amount(),
            self.params.rate(),
            self.params.period(),
            self.params.start_date()
        )
    }
}

/// Builds a loan from a method selector such as `"annuity"` or `"straight-line"`.
pub fn make_loan(
    method: &str,
    amount: f64,
    period: i64,
    annual_rate: f64,
    start_date: impl IntoStartDate,
) -> Result<Loan, ValidationError> {
    let method: Method = method.parse()?;
    let params = LoanParameters::new(amount, period, annual_rate, start_date)?;
    Ok(Loan::new(method, params))
}

/// Payment records zipped period by period from dates, day counts and
/// amortization rows. Single pass; call `Loan::schedule` again to re-read.
#[derive(Debug)]
pub struct Schedule {
    pmt_dates: std::vec::IntoIter<NaiveDate>,
    days: std::vec::IntoIter<i64>,
    amortization: Amortization,
}

impl Schedule {
    fn new(pmt_dates: Vec<NaiveDate>, days: Vec<i64>, amortization: Amortization) -> Self {
        assert!(
            pmt_dates.len() == days.len() && days.len() == amortization.len(),
            "invariant violation: {} payment dates, {} day counts, {} amortization rows",
            pmt_dates.len(),
            days.len(),
            amortization.len()
        );
        Self {
            pmt_dates: pmt_dates.into_iter(),
            days: days.into_iter(),
            amortization,
        }
    }
}

impl Iterator for Schedule {
    type Item = PaymentRecord;

    fn next(&mut self) -> Option<Self::Item> {
        match (
            self.pmt_dates.next(),
            self.days.next(),
            self.amortization.next(),
        ) {
            (Some(date), Some(days), Some(row)) => Some(PaymentRecord {
                date,
                days,
                principal: row.principal,
                interest: row.interest,
                payment: row.payment,
                balance: row.balance,
            }),
            (None, None, None) => None,
            _ => panic!("invariant violation: schedule sequences ended at different periods"),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.pmt_dates.size_hint()
    }
}

impl ExactSizeIterator for Schedule {}

pub fn round(amt: f64, dec_places: i32) -> f64 {
    if amt == 0. {
        0.
    } else {
        (amt * 10_f64.powi(dec_places)).round() / 10_f64.powi(dec_places)
    }
}

/// Totals over a payment schedule.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduleSummary {
    pub payments: usize,
    pub total_principal: f64,
    pub total_interest: f64,
    pub total_payment: f64,
}

impl ScheduleSummary {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a PaymentRecord>) -> Self {
        records
            .into_iter()
            .fold(ScheduleSummary::default(), |acc, pmt| ScheduleSummary {
                payments: acc.payments + 1,
                total_principal: acc.total_principal + pmt.principal,
                total_interest: acc.total_interest + pmt.interest,
                total_payment: acc.total_payment + pmt.payment,
            })
    }

    pub fn rounded(&self, dec_places: i32) -> Self {
        ScheduleSummary {
            payments: self.payments,
            total_principal: round(self.total_principal, dec_places),
            total_interest: round(self.total_interest, dec_places),
            total_payment: round(self.total_payment, dec_places),
        }
    }
}

impl fmt::Display for ScheduleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} payments, total principal {:.2}, total interest {:.2}, total paid {:.2}",
            self.payments, self.total_principal, self.total_interest, self.total_payment
        )
    }
}
