use amortize::{
    loan::{make_loan, PaymentRecord, ScheduleSummary, HEADERS},
    report::Format,
};
use clap::{ArgAction, Parser};
use log::{error, info};
use simple_logger::SimpleLogger;
use std::{error::Error, fs::File, io, path::PathBuf, process};

/// Loan amortization tools
#[derive(Parser, Debug)]
#[command(name = "amortize", version)]
struct Cli {
    /// loan amount
    #[arg(short, long, allow_negative_numbers = true)]
    amount: f64,

    /// loan period in months
    #[arg(short, long, allow_negative_numbers = true)]
    period: i64,

    /// annual interest rate, in percent
    #[arg(short, long, allow_negative_numbers = true)]
    rate: f64,

    /// start date of the loan in format "yyyy-mm-dd"
    #[arg(short, long)]
    date: String,

    /// loan method (annuity, straight-line)
    #[arg(short, long, default_value = "annuity")]
    method: String,

    /// output format (table, csv)
    #[arg(short, long, default_value = "table")]
    format: String,

    /// write the schedule to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// more logging, repeat for trace output
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    // csv on stdout stays machine readable unless asked otherwise
    let csv_to_stdout = cli.output.is_none() && cli.format.trim().eq_ignore_ascii_case("csv");
    let level = match cli.verbose {
        0 if csv_to_stdout => log::LevelFilter::Warn,
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    if let Err(e) = SimpleLogger::new().with_level(level).init() {
        eprintln!("logger setup failed: {}", e);
    }

    if let Err(e) = run(cli) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let format: Format = cli.format.parse()?;
    let loan = make_loan(&cli.method, cli.amount, cli.period, cli.rate, cli.date.as_str())?;
    info!("{}", loan);

    let records: Vec<PaymentRecord> = loan.schedule().collect();

    match &cli.output {
        Some(path) => {
            let mut file = File::create(path)?;
            format.write(&records, &HEADERS, &mut file)?;
            info!("schedule written to {}", path.display());
        }
        None => format.write(&records, &HEADERS, &mut io::stdout().lock())?,
    }

    info!("{}", ScheduleSummary::from_records(&records));
    Ok(())
}

// verifies that types can implement the gated traits below
#[cfg(test)]
fn is_normal<T: Sized + Send + Sync + Unpin>() {}

#[test]
fn normal_types() {
    is_normal::<PaymentRecord>();
    is_normal::<amortize::Loan>();
    is_normal::<amortize::loan::Schedule>();
}
