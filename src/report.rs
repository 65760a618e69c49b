//! Rendering of computed payment schedules.

use std::{fmt, io::Write, str::FromStr};

use tabled::{
    builder::Builder,
    settings::{object::Columns, Alignment, Modify, Style},
};

use crate::error::{ReportError, ValidationError};
use crate::loan::PaymentRecord;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Format {
    #[default]
    Table,
    Csv,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Table => write!(f, "table"),
            Format::Csv => write!(f, "csv"),
        }
    }
}

impl FromStr for Format {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(Format::Table),
            "csv" => Ok(Format::Csv),
            _ => Err(ValidationError::Format(s.to_string())),
        }
    }
}

impl Format {
    pub fn write<W: Write>(
        &self,
        records: &[PaymentRecord],
        headers: &[&str],
        out: &mut W,
    ) -> Result<(), ReportError> {
        match self {
            Format::Table => write_table(records, headers, out),
            Format::Csv => write_csv(records, headers, out),
        }
    }
}

/// Two decimals with thousands separators, e.g. `1,234,567.89`.
pub fn format_amount(amt: f64) -> String {
    let fixed = format!("{:.2}", amt.abs());
    let (int_part, dec_part) = fixed.split_at(fixed.len() - 3);

    let mut grouped = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // -0.00 prints without a sign
    if amt < 0. && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        format!("-{}{}", grouped, dec_part)
    } else {
        format!("{}{}", grouped, dec_part)
    }
}

fn record_fields(pmt: &PaymentRecord, amount: fn(f64) -> String) -> [String; 6] {
    [
        pmt.date.to_string(),
        pmt.days.to_string(),
        amount(pmt.principal),
        amount(pmt.interest),
        amount(pmt.payment),
        amount(pmt.balance),
    ]
}

pub fn write_table<W: Write>(
    records: &[PaymentRecord],
    headers: &[&str],
    out: &mut W,
) -> Result<(), ReportError> {
    let mut builder = Builder::default();
    builder.push_record(headers.iter().copied());
    for pmt in records {
        builder.push_record(record_fields(pmt, format_amount));
    }

    let table = builder
        .build()
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();

    writeln!(out, "{}", table)?;
    Ok(())
}

pub fn write_csv<W: Write>(
    records: &[PaymentRecord],
    headers: &[&str],
    out: &mut W,
) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(headers)?;
    for pmt in records {
        wtr.write_record(record_fields(pmt, |amt| format!("{:.2}", amt)))?;
    }
    wtr.flush()?;
    Ok(())
}
