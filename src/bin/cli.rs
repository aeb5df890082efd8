use chrono::{DateTime, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use num_bigint::BigInt;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use universal_bloom_rs::{
    DateGranularity, FilterConfigBuilder, UniversalBloomFilter, Value,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new filter file with custom configuration
    Create {
        /// Path to the filter file
        #[arg(short, long)]
        path: PathBuf,

        /// Date granularity: year, month, day, hour or minute
        #[arg(short, long, default_value = "day")]
        granularity: DateGranularity,

        /// Range enumeration step
        #[arg(short, long, default_value = "1")]
        step: u64,

        /// Decimal digits kept for fractional numbers
        #[arg(long, default_value = "2")]
        precision: u32,

        /// Expected number of records
        #[arg(short, long, default_value = "1000")]
        records: usize,

        /// False positive rate (between 0 and 1)
        #[arg(short, long, default_value = "0.1")]
        error_rate: f64,

        /// Maximum values a single range may enumerate (0 disables the guard)
        #[arg(long, default_value = "10000000")]
        max_range_steps: u64,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Insert values; several values are inserted as a list
    Insert {
        #[arg(short, long)]
        path: PathBuf,

        #[arg(required = true)]
        values: Vec<String>,

        /// Treat values as text instead of guessing their type
        #[arg(long)]
        text: bool,
    },

    /// Check values; several values must all be present
    Check {
        #[arg(short, long)]
        path: PathBuf,

        #[arg(required = true)]
        values: Vec<String>,

        #[arg(long)]
        text: bool,
    },

    /// Insert every stepped value of an inclusive range
    InsertRange {
        #[arg(short, long)]
        path: PathBuf,
        start: String,
        end: String,
    },

    /// Check that every stepped value of an inclusive range is present
    CheckRange {
        #[arg(short, long)]
        path: PathBuf,
        start: String,
        end: String,
    },

    /// Display information about the filter
    Info {
        #[arg(short, long)]
        path: PathBuf,
    },
}

/// Guesses the kind of a command-line value: integer, then number, then
/// timestamp, otherwise text.
fn parse_value(raw: &str) -> Value {
    if let Ok(v) = raw.parse::<i64>() {
        return Value::Int(v);
    }
    if let Ok(v) = raw.parse::<BigInt>() {
        return Value::from(v);
    }
    if let Ok(v) = raw.parse::<f64>() {
        if v.is_finite() {
            return Value::Float(v);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Value::Timestamp(ts.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Value::Timestamp(ts);
        }
    }
    if let Some(ts) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Value::Timestamp(ts);
    }
    Value::Text(raw.to_owned())
}

fn parse_values(raw: &[String], text: bool) -> Vec<Value> {
    raw.iter()
        .map(|v| {
            if text {
                Value::Text(v.clone())
            } else {
                parse_value(v)
            }
        })
        .collect()
}

fn open(path: &Path) -> Result<UniversalBloomFilter, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!(
            "No filter at {}, use the 'create' command first",
            path.display()
        )
        .into());
    }
    Ok(UniversalBloomFilter::load(path)?)
}

fn ensure_creatable(
    path: &Path,
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() && !force {
        return Err(format!(
            "Filter already exists at {}, use --force to overwrite it",
            path.display()
        )
        .into());
    }
    Ok(())
}

fn report(found: bool, what: &str) {
    if found {
        println!("{what} is possibly in the filter");
    } else {
        println!("{what} is definitely not in the filter");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Create {
            path,
            granularity,
            step,
            precision,
            records,
            error_rate,
            max_range_steps,
            force,
        } => {
            ensure_creatable(&path, force)?;

            let config = FilterConfigBuilder::default()
                .date_granularity(granularity)
                .step(step)
                .precision(precision)
                .expected_num_records(records)
                .error_rate(error_rate)
                .max_range_steps((max_range_steps > 0).then_some(max_range_steps))
                .build()?;

            let filter = UniversalBloomFilter::new(config)?;
            filter.save(&path)?;

            println!("Created new filter at {}", path.display());
            println!("  {filter}");
            println!("  Bit vector size: {}", filter.set().bit_len());
            println!("  Number of hash functions: {}", filter.set().num_hashes());
        }
        Commands::Insert { path, values, text } => {
            let mut filter = open(&path)?;
            let values = parse_values(&values, text);
            let count = values.len();
            filter.insert_list(values)?;
            filter.save(&path)?;
            println!("Inserted {count} value(s)");
        }
        Commands::Check { path, values, text } => {
            let filter = open(&path)?;
            let what = values.join(", ");
            let found = filter.check_list(parse_values(&values, text))?;
            report(found, &what);
        }
        Commands::InsertRange { path, start, end } => {
            let mut filter = open(&path)?;
            filter.insert_range(parse_value(&start), parse_value(&end))?;
            filter.save(&path)?;
            println!("Inserted range [{start}, {end}] with step {}", filter.step());
        }
        Commands::CheckRange { path, start, end } => {
            let filter = open(&path)?;
            let found =
                filter.check_range(parse_value(&start), parse_value(&end))?;
            report(found, &format!("Range [{start}, {end}]"));
        }
        Commands::Info { path } => {
            let filter = open(&path)?;
            let config = filter.config();
            println!("Filter: {}", path.display());
            println!("  Granularity: {}", config.date_granularity);
            println!("  Step: {}", config.step);
            println!("  Precision: {}", config.precision);
            println!("  Expected records: {}", filter.capacity());
            println!("  False positive rate: {:.4}", filter.error_rate());
            match config.max_range_steps {
                Some(limit) => println!("  Max range steps: {limit}"),
                None => println!("  Max range steps: unlimited"),
            }
            println!("  Bit vector size: {}", filter.set().bit_len());
            println!("  Number of hash functions: {}", filter.set().num_hashes());
            println!("  Bits set: {}", filter.set().ones());
            println!("  Approximate element count: {}", filter.len());
        }
    }

    Ok(())
}
