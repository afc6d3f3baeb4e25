//! rasterstat CLI - statistics report for multi-band images

mod report;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use rasterstat_algorithms::format::DecimalFormat;
use rasterstat_algorithms::statistics::{HistogramPooling, ImageStatistics};
use rasterstat_core::io::{load_image, RawGeometry};
use rasterstat_core::SampleBuffer;

use report::{Artifacts, OutputFormat, RateRequest, Report, ReportConfig, Statistic, TotalsMode};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "rasterstat")]
#[command(author, version, about = "Statistics of multi-band images", long_about = None)]
struct Cli {
    /// Input image (TIFF, or raw with --geometry)
    #[arg(required_unless_present = "input")]
    path: Option<PathBuf>,

    /// Input image, alternative to the positional argument
    #[arg(short, long, conflicts_with = "path")]
    input: Option<PathBuf>,

    /// Raw image geometry: bands, rows, cols, sample type code (0 bool,
    /// 1 u8, 2 u16, 3 i16, 4 i32, 5 i64, 6 f32, 7 f64), byte order (0 big, 1 little)
    #[arg(short, long, num_args = 5, value_names = ["BANDS", "ROWS", "COLS", "TYPE", "ORDER"])]
    geometry: Option<Vec<u64>>,

    /// Statistic to report
    #[arg(short, long, value_enum, default_value = "all")]
    statistic: StatisticArg,

    /// Output layout
    #[arg(short, long, value_enum, default_value = "long")]
    format: FormatArg,

    /// Per-band blocks, totals block, or both
    #[arg(short, long, value_enum, default_value = "both")]
    totals: TotalsArg,

    /// Rate kind code (0 off, 1 factor, 2 ratio, 3 bits per sample) and values
    #[arg(short, long, num_args = 2.., allow_negative_numbers = true, value_names = ["KIND", "VALUE"])]
    rate: Option<Vec<String>>,

    /// Values for value-counts and value-percentages
    #[arg(short, long, num_args = 1.., allow_negative_numbers = true)]
    values: Vec<i64>,

    /// Totals histogram taken from the first band only
    #[arg(long)]
    first_band_totals: bool,

    /// Maximum fractional digits for energy, variance and entropy
    #[arg(long, default_value = "100")]
    precision: usize,

    /// Verbose output
    #[arg(long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatisticArg {
    None,
    All,
    MinMax,
    Mean,
    CenterRange,
    ValueCounts,
    ValuePercentages,
    Histogram,
    HistogramPercentages,
    Energy,
    Variance,
    Entropy,
}

impl From<StatisticArg> for Statistic {
    fn from(arg: StatisticArg) -> Self {
        match arg {
            StatisticArg::None => Statistic::None,
            StatisticArg::All => Statistic::All,
            StatisticArg::MinMax => Statistic::MinMax,
            StatisticArg::Mean => Statistic::Mean,
            StatisticArg::CenterRange => Statistic::CenterRange,
            StatisticArg::ValueCounts => Statistic::ValueCounts,
            StatisticArg::ValuePercentages => Statistic::ValuePercentages,
            StatisticArg::Histogram => Statistic::Histogram,
            StatisticArg::HistogramPercentages => Statistic::HistogramPercentages,
            StatisticArg::Energy => Statistic::Energy,
            StatisticArg::Variance => Statistic::Variance,
            StatisticArg::Entropy => Statistic::Entropy,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Long,
    Short,
}

#[derive(Clone, Copy, ValueEnum)]
enum TotalsArg {
    Components,
    Both,
    Totals,
}

impl Cli {
    fn input_path(&self) -> Result<&Path> {
        self.path
            .as_deref()
            .or(self.input.as_deref())
            .context("No input image given")
    }

    fn raw_geometry(&self) -> Result<Option<RawGeometry>> {
        let Some(codes) = &self.geometry else {
            return Ok(None);
        };
        let codes: [u64; 5] = codes
            .as_slice()
            .try_into()
            .context("Geometry needs exactly five numbers")?;
        let geometry = RawGeometry::from_codes(codes).context("Invalid raw geometry")?;
        Ok(Some(geometry))
    }

    fn rate_request(&self) -> Result<Option<RateRequest>> {
        let Some(args) = &self.rate else {
            return Ok(None);
        };
        let (code, values) = args.split_first().context("Rate needs a kind code")?;
        let code: i64 = code
            .parse()
            .with_context(|| format!("Invalid rate kind code: {}", code))?;
        let values = values
            .iter()
            .map(|v| {
                v.parse::<f64>()
                    .with_context(|| format!("Invalid rate value: {}", v))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(RateRequest { code, values }))
    }

    fn report_config(&self) -> Result<ReportConfig> {
        let statistic = Statistic::from(self.statistic);
        if !self.values.is_empty() && !statistic.needs_values() {
            warn!("--values is ignored for this statistic");
        }

        Ok(ReportConfig {
            statistic,
            format: match self.format {
                FormatArg::Long => OutputFormat::Long,
                FormatArg::Short => OutputFormat::Short,
            },
            totals: match self.totals {
                TotalsArg::Components => TotalsMode::Components,
                TotalsArg::Both => TotalsMode::Both,
                TotalsArg::Totals => TotalsMode::Totals,
            },
            values: self.values.clone(),
            pooling: if self.first_band_totals {
                HistogramPooling::FirstBand
            } else {
                HistogramPooling::Sum
            },
            decimal: DecimalFormat::new(self.precision),
            rate: self.rate_request()?,
        })
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("warning: logging already initialised");
    }
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_image(path: &Path, geometry: Option<&RawGeometry>) -> Result<SampleBuffer> {
    let pb = spinner("Reading image...");
    let buffer = load_image(path, geometry)
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    pb.finish_and_clear();
    info!(
        "Input: {} bands, {} x {}",
        buffer.bands(),
        buffer.cols(),
        buffer.rows()
    );
    let types: Vec<String> = buffer.sample_types().iter().map(ToString::to_string).collect();
    debug!("Sample types: {}", types.join(", "));
    Ok(buffer)
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let input = cli.input_path()?.to_path_buf();
    let geometry = cli.raw_geometry()?;
    let config = cli.report_config()?;
    debug!("Report configuration: {:?}", config);

    let buffer = read_image(&input, geometry.as_ref())?;
    let stats = ImageStatistics::new(&buffer);
    let report = Report::new(&stats, &config)?;

    let start = Instant::now();
    let mut artifacts = Artifacts::create(&input, config.statistic)?;
    let mut out = BufWriter::new(std::io::stdout().lock());
    report.write_statistics(&mut out, &mut artifacts)?;

    report.write_rate_section(&mut out)?;

    out.flush()?;
    debug!("Processing time: {:.2?}", start.elapsed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("rasterstat").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["image.tif"]);
        let config = cli.report_config().unwrap();
        assert_eq!(config.statistic, Statistic::All);
        assert_eq!(config.format, OutputFormat::Long);
        assert_eq!(config.totals, TotalsMode::Both);
        assert_eq!(config.pooling, HistogramPooling::Sum);
        assert_eq!(config.decimal.max_fraction_digits, 100);
        assert!(config.rate.is_none());
        assert_eq!(cli.input_path().unwrap(), Path::new("image.tif"));
    }

    #[test]
    fn test_input_flag() {
        let cli = parse(&["-i", "other.tif"]);
        assert_eq!(cli.input_path().unwrap(), Path::new("other.tif"));
    }

    #[test]
    fn test_missing_input_rejected() {
        assert!(Cli::try_parse_from(["rasterstat", "-s", "mean"]).is_err());
    }

    #[test]
    fn test_geometry() {
        let cli = parse(&["image.raw", "-g", "3", "4", "5", "2", "1"]);
        let geometry = cli.raw_geometry().unwrap().unwrap();
        assert_eq!(geometry.bands, 3);
        assert_eq!(geometry.rows, 4);
        assert_eq!(geometry.cols, 5);
        assert!(Cli::try_parse_from(["rasterstat", "image.raw", "-g", "3", "4"]).is_err());
    }

    #[test]
    fn test_value_statistics() {
        let cli = parse(&["image.tif", "-s", "value-counts", "-v", "0", "255", "-f", "short"]);
        let config = cli.report_config().unwrap();
        assert_eq!(config.statistic, Statistic::ValueCounts);
        assert_eq!(config.values, vec![0, 255]);
        assert_eq!(config.format, OutputFormat::Short);

        let cli = parse(&["image.tif", "-s", "value-counts", "-v", "-1"]);
        assert_eq!(cli.values, vec![-1]);
    }

    #[test]
    fn test_rate_request() {
        let cli = parse(&["image.tif", "-r", "3", "4", "2.5"]);
        let rate = cli.report_config().unwrap().rate.unwrap();
        assert_eq!(rate.code, 3);
        assert_eq!(rate.values, vec![4.0, 2.5]);

        let cli = parse(&["image.tif", "-r", "x", "4"]);
        assert!(cli.report_config().is_err());

        let cli = parse(&["image.tif", "-r", "1000", "4"]);
        assert_eq!(cli.report_config().unwrap().rate.unwrap().code, 1000);
    }

    #[test]
    fn test_totals_options() {
        let cli = parse(&["image.tif", "-t", "totals", "--first-band-totals", "--precision", "5"]);
        let config = cli.report_config().unwrap();
        assert_eq!(config.totals, TotalsMode::Totals);
        assert_eq!(config.pooling, HistogramPooling::FirstBand);
        assert_eq!(config.decimal.max_fraction_digits, 5);
    }
}
