use log::trace;
use std::{fmt, str::FromStr};

use crate::date::DayCount;
use crate::error::ValidationError;
use crate::loan::LoanParameters;

/// Repayment scheme of a loan.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Method {
    /// Equal total payment every period.
    Annuity,
    /// Equal principal portion every period, interest on the declining balance.
    StraightLine,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Annuity => write!(f, "annuity"),
            Method::StraightLine => write!(f, "straight-line"),
        }
    }
}

impl FromStr for Method {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "ann" | "annuity" => Ok(Method::Annuity),
            "s" | "sl" | "str" | "straight-line" | "straight_line" | "d" | "diff"
            | "differentiated" => Ok(Method::StraightLine),
            _ => Err(ValidationError::Method(s.to_string())),
        }
    }
}

/// One period of an amortization, not yet bound to a payment date.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct AmortizationRow {
    pub payment: f64,
    pub balance: f64,
    pub principal: f64,
    pub interest: f64,
}

/// Monthly rate as a decimal, from an annual percentage.
pub fn monthly_rate(annual_rate: f64) -> f64 {
    annual_rate / 1200.
}

/// Constant total payment of an annuity loan.
pub fn annuity_payment(principal: f64, period: u32, annual_rate: f64) -> f64 {
    let pmt_rate = monthly_rate(annual_rate);
    // (1 + r)^n - 1 without cancellation for rates close to zero
    let growth = (period as f64 * pmt_rate.ln_1p()).exp_m1();
    if growth == 0. {
        return principal / period as f64;
    }
    principal * pmt_rate * (growth + 1.) / growth
}

/// Interest accrued on `balance` over `year_fraction` of a year (actual/actual).
pub fn accrued_interest(balance: f64, annual_rate: f64, year_fraction: f64) -> f64 {
    balance * (annual_rate / 100.) * year_fraction
}

/// Lazily computed amortization rows, one per period, in payment order.
///
/// The iterator is single pass. `Loan::amortize` builds a fresh one on every call.
#[derive(Debug)]
pub struct Amortization {
    method: Method,
    annual_rate: f64,
    period: u32,
    // total payment for annuity loans, principal portion for straight-line loans
    installment: f64,
    balance: f64,
    pmt_number: u32,
    day_counts: std::vec::IntoIter<DayCount>,
}

impl Amortization {
    /// Panics unless there is exactly one day count per period of the loan.
    pub fn new(method: Method, params: &LoanParameters, day_counts: Vec<DayCount>) -> Self {
        assert_eq!(
            day_counts.len(),
            params.period() as usize,
            "invariant violation: {} day counts for a {} month loan",
            day_counts.len(),
            params.period()
        );
        let installment = match method {
            Method::Annuity => annuity_payment(params.amount(), params.period(), params.rate()),
            Method::StraightLine => params.amount() / params.period() as f64,
        };
        Self {
            method,
            annual_rate: params.rate(),
            period: params.period(),
            installment,
            balance: params.amount(),
            pmt_number: 0,
            day_counts: day_counts.into_iter(),
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Computes the row for a period starting at `balance`.
    ///
    /// The last annuity period absorbs whatever balance is left so that the
    /// loan is fully repaid.
    pub fn compute_row(&self, balance: f64, year_fraction: f64, is_last: bool) -> AmortizationRow {
        let interest = accrued_interest(balance, self.annual_rate, year_fraction);
        let mut principal = match self.method {
            Method::Annuity => self.installment - interest,
            Method::StraightLine => self.installment,
        };
        let mut end_balance = balance - principal;

        if is_last && self.method == Method::Annuity {
            principal += end_balance;
            end_balance = 0.;
        }

        AmortizationRow {
            payment: interest + principal,
            balance: end_balance,
            principal,
            interest,
        }
    }
}

impl Iterator for Amortization {
    type Item = AmortizationRow;

    fn next(&mut self) -> Option<Self::Item> {
        let day_count = self.day_counts.next()?;
        self.pmt_number += 1;

        let row = self.compute_row(
            self.balance,
            day_count.to_year_fraction(),
            self.pmt_number == self.period,
        );
        self.balance = row.balance;

        trace!(
            "pmt # {}, days {}, interest {}, principal {}, end bal {}",
            self.pmt_number,
            day_count.total_days(),
            row.interest,
            row.principal,
            row.balance
        );
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.day_counts.size_hint()
    }
}

impl ExactSizeIterator for Amortization {}

#[cfg(test)]
mod tests {
    use super::{accrued_interest, annuity_payment, monthly_rate, Amortization, Method};
    use crate::calendar::RussianCalendar;
    use crate::date::count_days;
    use crate::error::ValidationError;
    use crate::loan::LoanParameters;
    use chrono::NaiveDate;
    use test_log::test;

    fn params(amount: f64, period: i64, rate: f64) -> LoanParameters {
        LoanParameters::new(amount, period, rate, NaiveDate::from_ymd_opt(2021, 5, 15).unwrap())
            .unwrap()
    }

    fn amortize(method: Method, params: &LoanParameters) -> Amortization {
        let days = count_days(params.start_date(), params.period(), &RussianCalendar);
        Amortization::new(method, params, days)
    }

    #[test]
    fn test_method_from_str() {
        for s in ["a", "ann", "annuity", "Annuity"] {
            assert_eq!(s.parse::<Method>(), Ok(Method::Annuity));
        }
        for s in ["s", "sl", "str", "straight-line", "diff", "differentiated"] {
            assert_eq!(s.parse::<Method>(), Ok(Method::StraightLine));
        }
        assert_eq!(
            "balloon".parse::<Method>(),
            Err(ValidationError::Method("balloon".to_string()))
        );
    }

    #[test]
    fn test_monthly_rate() {
        assert!((monthly_rate(20.) - 20. / 1200.).abs() < 1e-15);
    }

    #[test]
    fn test_annuity_payment() {
        assert!((annuity_payment(1000., 5, 20.) - 210.11).abs() < 0.005);
    }

    #[test]
    fn test_annuity_payment_near_zero_rate() {
        let payment = annuity_payment(1000., 5, 1e-17);
        assert!(payment.is_finite());
        assert!((payment - 200.).abs() < 1e-9);
        // matches the closed form for ordinary rates
        let factor = (1. + 0.01_f64).powi(24);
        let expected = 5000. * 0.01 * factor / (factor - 1.);
        assert!((annuity_payment(5000., 24, 12.) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_tiny_rate_schedule_is_finite() {
        let loan = params(1000., 5, 1e-17);
        let rows: Vec<_> = amortize(Method::Annuity, &loan).collect();
        for row in &rows {
            assert!(row.payment.is_finite() && row.principal.is_finite());
            assert!(row.interest.is_finite() && row.balance.is_finite());
            assert!((row.payment - row.principal - row.interest).abs() < 1e-9);
        }
        let total_principal: f64 = rows.iter().map(|r| r.principal).sum();
        assert!((total_principal - 1000.).abs() < 0.01);
        assert_eq!(rows[4].balance, 0.);
    }

    #[test]
    #[should_panic(expected = "invariant violation")]
    fn test_day_counts_must_cover_every_period() {
        let loan = params(1000., 5, 20.);
        let mut days = count_days(loan.start_date(), loan.period(), &RussianCalendar);
        days.pop();
        Amortization::new(Method::Annuity, &loan, days);
    }

    #[test]
    fn test_accrued_interest() {
        let interest = accrued_interest(1000., 20., 31. / 365.);
        assert!((interest - 16.986301).abs() < 1e-6);
    }

    #[test]
    fn test_annuity_rows() {
        let loan = params(1000., 5, 20.);
        let rows: Vec<_> = amortize(Method::Annuity, &loan).collect();
        assert_eq!(rows.len(), 5);

        // every period but the last pays the annuity amount
        for row in &rows[..4] {
            assert!((row.payment - 210.110182).abs() < 1e-6);
        }
        assert!((rows[0].interest - 16.986301).abs() < 1e-6);
        assert!((rows[0].balance - 806.876119).abs() < 1e-6);
        assert_eq!(rows[4].balance, 0.);
        assert!((rows[4].payment - 210.662490).abs() < 1e-6);

        let total_payment: f64 = rows.iter().map(|r| r.payment).sum();
        assert!((total_payment - 1051.10).abs() < 0.005);
    }

    #[test]
    fn test_straight_line_rows() {
        let loan = params(5000., 5, 20.);
        let rows: Vec<_> = amortize(Method::StraightLine, &loan).collect();
        assert_eq!(rows.len(), 5);

        for row in &rows {
            assert_eq!(row.principal, 1000.);
            assert!((row.payment - row.principal - row.interest).abs() < 1e-9);
        }
        let balances: Vec<f64> = rows.iter().map(|r| r.balance).collect();
        assert_eq!(balances, vec![4000., 3000., 2000., 1000., 0.]);
        // payments decline as the balance shrinks
        assert!(rows.windows(2).all(|w| w[1].interest < w[0].interest));
    }

    #[test]
    fn test_compute_row_last_annuity_period_clears_balance() {
        let loan = params(1000., 5, 20.);
        let amortization = amortize(Method::Annuity, &loan);
        let row = amortization.compute_row(250., 30. / 365., true);
        assert_eq!(row.balance, 0.);
        assert!((row.principal - 250.).abs() < 1e-9);
        assert!((row.payment - row.principal - row.interest).abs() < 1e-9);
    }

    #[test]
    fn test_amortization_is_exact_size() {
        let loan = params(1000., 12, 7.5);
        let amortization = amortize(Method::Annuity, &loan);
        assert_eq!(amortization.len(), 12);
    }
}
