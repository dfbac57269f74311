//! opat CLI
//!
//! Usage:
//!   opat stats --input fund_return.csv --period month
//!   opat holdings --trades trades.csv --start 2024-01-02 --output holdings.csv
//!   opat plot --input fund_return.csv --output fund.html --vami --title "Fund"

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use opat::config::Config;
use opat::data::{Holding, TimeFrame};
use opat::io::{parse_date, CsvLoader};
use opat::plot::{highstock_line, to_highchart_series, ChartOptions};
use opat::portfolio::create_holdings;
use opat::stats::{annualized_return, cum_return, period_return, total_return, vami, Period};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "opat")]
#[command(about = "Open Portfolio Analysis Tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Performance statistics of a returns file
    Stats {
        /// CSV of simple returns, first column is the date
        #[arg(short, long)]
        input: String,

        /// Period for compounded returns (week, month, quarter, year)
        #[arg(short, long, default_value = "month")]
        period: String,

        /// VAMI starting value (defaults to config, 1000)
        #[arg(long)]
        starting_value: Option<f64>,

        /// Observations per year for annualizing (defaults to config, 252)
        #[arg(long)]
        periods_per_year: Option<f64>,

        /// Rows to show of each table
        #[arg(long, default_value = "5")]
        head: usize,

        /// Write the period returns to this CSV file
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Build daily holdings from a trade blotter
    Holdings {
        /// CSV with Date, Contract, Type, Price, Quantity, Action columns
        #[arg(short, long)]
        trades: String,

        /// First holdings date (YYYY-MM-DD), defaults to the first trade
        #[arg(short, long)]
        start: Option<String>,

        /// Last holdings date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        end: Option<String>,

        /// Write holdings to this CSV file instead of printing them
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Render a time series as a Highstock HTML page
    Plot {
        /// CSV time series, first column is the date
        #[arg(short, long)]
        input: String,

        /// HTML file to write
        #[arg(short, long)]
        output: String,

        /// Chart title
        #[arg(short, long)]
        title: Option<String>,

        /// Chart width, e.g. 800px
        #[arg(long)]
        width: Option<String>,

        /// Chart height, e.g. 600px
        #[arg(long)]
        height: Option<String>,

        /// Treat the input as returns and plot their VAMI
        #[arg(long)]
        vami: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok()))
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let loader = CsvLoader::new().with_delimiter(config.io.delimiter_byte()?);

    match cli.command {
        Commands::Stats {
            input,
            period,
            starting_value,
            periods_per_year,
            head,
            output,
        } => {
            let period: Period = period.parse()?;
            let starting_value = starting_value.unwrap_or(config.stats.starting_value);
            let periods_per_year = periods_per_year.unwrap_or(config.stats.periods_per_year);
            run_stats(&loader, &input, period, starting_value, periods_per_year, head, output.as_deref())
        }

        Commands::Holdings {
            trades,
            start,
            end,
            output,
        } => run_holdings(&loader, &trades, start.as_deref(), end.as_deref(), output.as_deref()),

        Commands::Plot {
            input,
            output,
            title,
            width,
            height,
            vami,
        } => {
            let mut options = ChartOptions::from(&config.plot);
            options.title = title;
            if let Some(width) = width {
                options.width = width;
            }
            if let Some(height) = height {
                options.height = height;
            }
            let starting_value = vami.then_some(config.stats.starting_value);
            run_plot(&loader, &input, &output, &options, starting_value)
        }
    }
}

/// `RUST_LOG` when set and valid, otherwise `opat=info`
fn log_filter(rust_log: Option<String>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("opat=info"))
}

fn run_stats(
    loader: &CsvLoader,
    input: &str,
    period: Period,
    starting_value: f64,
    periods_per_year: f64,
    head: usize,
    output: Option<&str>,
) -> Result<()> {
    let returns = loader.load_time_series(input)?;

    print_header(input, &returns);
    print_frame("RETURNS", &returns.head(head));
    print_frame("CUMULATIVE RETURN", &cum_return(&returns).head(head));
    print_frame(
        &format!("VAMI (start {})", starting_value),
        &vami(&returns, starting_value).head(head),
    );

    let by_period = period_return(&returns, period)?;
    print_frame(&format!("{} RETURNS", period.to_string().to_uppercase()), &by_period.head(head));

    println!("\x1b[1;33mSUMMARY\x1b[0m");
    let totals = total_return(&returns);
    let annualized = annualized_return(&returns, periods_per_year);
    for ((name, total), (_, annual)) in totals.iter().zip(&annualized) {
        println!(
            "  {:<20} total {:>+9.2}%   annualized {:>+9.2}%",
            name,
            total * 100.0,
            annual * 100.0
        );
    }
    print_footer();

    if let Some(path) = output {
        loader.save_time_series(&by_period, path)?;
        println!("\nExported {} returns to: {}", period, path);
    }

    Ok(())
}

fn run_holdings(
    loader: &CsvLoader,
    trades_path: &str,
    start: Option<&str>,
    end: Option<&str>,
    output: Option<&str>,
) -> Result<()> {
    let trades = loader.load_trades(trades_path)?;

    let start = start
        .map(parse_date)
        .transpose()
        .context("Invalid start date")?;
    let end = end.map(parse_date).transpose().context("Invalid end date")?;

    let holdings = create_holdings(&trades, start, end)?;

    match output {
        Some(path) => {
            loader.save_holdings(&holdings, path)?;
            println!("Exported {} holdings rows to: {}", holdings.len(), path);
        }
        None => print_holdings(&holdings),
    }

    Ok(())
}

fn run_plot(
    loader: &CsvLoader,
    input: &str,
    output: &str,
    options: &ChartOptions,
    vami_start: Option<f64>,
) -> Result<()> {
    let frame = loader.load_time_series(input)?;
    let frame = match vami_start {
        Some(start) => vami(&frame, start),
        None => frame,
    };

    let html = highstock_line(&to_highchart_series(&frame), options)?;
    std::fs::write(output, html).with_context(|| format!("Failed to write {}", output))?;

    info!("Wrote chart of {} series to {}", frame.columns().len(), output);
    println!("Chart written to: {}", output);
    Ok(())
}

fn print_header(input: &str, frame: &TimeFrame) {
    println!();
    println!("\x1b[1;36m{}\x1b[0m", "═".repeat(55));
    println!("\x1b[1;36m         PORTFOLIO STATISTICS: {}\x1b[0m", input);
    println!("\x1b[1;36m{}\x1b[0m", "═".repeat(55));

    if let (Some(first), Some(last)) = (frame.index().first(), frame.index().last()) {
        println!(
            "Period: {} → {} | Observations: {}",
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d"),
            frame.len()
        );
    }
    println!();
}

fn print_frame(title: &str, frame: &TimeFrame) {
    println!("\x1b[1;33m{}\x1b[0m", title);

    print!("  {:<12}", "Date");
    for name in frame.columns() {
        print!(" {:>14}", name);
    }
    println!();

    for i in 0..frame.len() {
        let Some((date, row)) = frame.row(i) else {
            break;
        };
        print!("  {:<12}", date.format("%Y-%m-%d"));
        for value in row {
            if value.is_nan() {
                print!(" {:>14}", "NaN");
            } else {
                print!(" {:>14.6}", value);
            }
        }
        println!();
    }
    println!();
}

fn print_footer() {
    println!("\x1b[1;36m{}\x1b[0m", "═".repeat(55));
}

fn print_holdings(holdings: &[Holding]) {
    println!("\x1b[1;33mHOLDINGS\x1b[0m");
    println!(
        "{:<12} {:<12} {:<14} {:>14} {:>14} {:>16}",
        "Date", "Contract", "Type", "Average Cost", "Quantity", "Cost Basis"
    );
    println!("{}", "-".repeat(87));

    for h in holdings {
        println!("{}", holding_row(h));
    }
}

fn holding_row(h: &Holding) -> String {
    let qty_color = if h.quantity.is_sign_negative() {
        "\x1b[31m"
    } else {
        "\x1b[32m"
    };

    format!(
        "{:<12} {:<12} {:<14} {:>14.4} {}{:>14}\x1b[0m {:>16.2}",
        h.date.format("%Y-%m-%d"),
        h.contract,
        h.asset_type,
        h.average_cost,
        qty_color,
        h.quantity.normalize().to_string(),
        h.cost_basis(),
    )
}
