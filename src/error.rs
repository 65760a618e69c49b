use thiserror::Error;

/// Rejected loan input. Raised by the constructor or setter that received the
/// offending value; a schedule is never computed from invalid parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("invalid amount {0}: must be a positive number")]
    Amount(f64),

    #[error("invalid period {0}: must be a positive whole number of months, at most {max}", max = crate::loan::MAX_PERIOD)]
    Period(i64),

    #[error("invalid interest rate {0}: must be a positive annual percentage")]
    Rate(f64),

    #[error("invalid start date '{0}': expected a calendar date in format yyyy-mm-dd")]
    StartDate(String),

    #[error("invalid method option '{0}': expected annuity or straight-line")]
    Method(String),

    #[error("invalid format option '{0}': expected table or csv")]
    Format(String),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write schedule: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
}
