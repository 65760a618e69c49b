//! Loan amortization schedules with business-day payment dates and
//! actual/actual interest accrual.

pub mod amortization;
pub mod calendar;
pub mod date;
pub mod error;
pub mod loan;
pub mod report;

pub use amortization::{AmortizationRow, Method};
pub use calendar::{HolidayCalendar, RussianCalendar};
pub use date::DayCount;
pub use error::{ReportError, ValidationError};
pub use loan::{make_loan, Loan, LoanParameters, PaymentRecord, Schedule, ScheduleSummary, HEADERS};
pub use report::Format;
