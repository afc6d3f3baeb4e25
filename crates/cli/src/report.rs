//! Report driver: selects statistics, formats them and writes the
//! energy/variance/entropy side files.

use anyhow::{Context, Result};
use tracing::warn;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rasterstat_algorithms::format::DecimalFormat;
use rasterstat_algorithms::rate::{RateEstimator, RateKind};
use rasterstat_algorithms::statistics::histogram::require_byte_image;
use rasterstat_algorithms::statistics::{HistogramPooling, ImageStatistics, BYTE_BINS};

/// Which statistic a report shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    None,
    /// Min/max, mean, center range, energy, variance and entropy
    All,
    MinMax,
    Mean,
    CenterRange,
    /// Occurrences of selected values
    ValueCounts,
    /// Percentage of selected values
    ValuePercentages,
    /// Occurrences of every value 0..=255
    Histogram,
    /// Percentage of every value 0..=255
    HistogramPercentages,
    Energy,
    Variance,
    Entropy,
}

impl Statistic {
    /// Whether a value selection is required
    pub fn needs_values(self) -> bool {
        matches!(self, Self::ValueCounts | Self::ValuePercentages)
    }

    /// Whether every band must hold 8-bit unsigned samples
    pub fn needs_byte_samples(self) -> bool {
        matches!(
            self,
            Self::ValueCounts | Self::ValuePercentages | Self::Histogram | Self::HistogramPercentages
        )
    }

    fn shows(self, field: Field) -> bool {
        match self {
            Self::All => true,
            Self::MinMax => field == Field::MinMax,
            Self::Mean => field == Field::Mean,
            Self::CenterRange => field == Field::CenterRange,
            Self::Energy => field == Field::Measure(Measure::Energy),
            Self::Variance => field == Field::Measure(Measure::Variance),
            Self::Entropy => field == Field::Measure(Measure::Entropy),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    MinMax,
    Mean,
    CenterRange,
    Measure(Measure),
}

/// Statistics rendered by the decimal formatter and mirrored to side files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Measure {
    Energy,
    Variance,
    Entropy,
}

impl Measure {
    const ALL: [Measure; 3] = [Measure::Energy, Measure::Variance, Measure::Entropy];

    fn label(self) -> &'static str {
        match self {
            Self::Energy => "  ENERGY      : ",
            Self::Variance => "  VARIANCE    : ",
            Self::Entropy => "  ENTROPY     : ",
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Self::Energy => "energy",
            Self::Variance => "variance",
            Self::Entropy => "entropy",
        }
    }
}

/// Output layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One labelled line per statistic
    #[default]
    Long,
    /// One `:`-separated line per band
    Short,
}

/// Which blocks a multi-band report shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TotalsMode {
    /// Per-band blocks only
    Components,
    /// Per-band blocks followed by the totals block
    #[default]
    Both,
    /// Totals block only
    Totals,
}

/// Validated report configuration
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub statistic: Statistic,
    pub format: OutputFormat,
    pub totals: TotalsMode,
    /// Values of interest, each in 0..=255
    pub values: Vec<i64>,
    pub pooling: HistogramPooling,
    pub decimal: DecimalFormat,
    pub rate: Option<RateRequest>,
}

/// Requested compressed size estimates
#[derive(Debug, Clone, PartialEq)]
pub struct RateRequest {
    /// Rate kind code, `0` disables estimation
    pub code: i64,
    pub values: Vec<f64>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            statistic: Statistic::All,
            format: OutputFormat::Long,
            totals: TotalsMode::Both,
            values: Vec::new(),
            pooling: HistogramPooling::Sum,
            decimal: DecimalFormat::default(),
            rate: None,
        }
    }
}

/// Append-only side files holding one decimal value per line
#[derive(Default)]
pub struct Artifacts {
    energy: Option<BufWriter<File>>,
    variance: Option<BufWriter<File>>,
    entropy: Option<BufWriter<File>>,
}

impl Artifacts {
    /// Create (truncating) `<input>_energy`, `<input>_variance` and
    /// `<input>_entropy` for the statistics the report will show
    pub fn create(input: &Path, statistic: Statistic) -> Result<Self> {
        let open = |measure: Measure| -> Result<Option<BufWriter<File>>> {
            if !statistic.shows(Field::Measure(measure)) {
                return Ok(None);
            }
            let path = artifact_path(input, measure.suffix());
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Ok(Some(BufWriter::new(file)))
        };

        Ok(Self {
            energy: open(Measure::Energy)?,
            variance: open(Measure::Variance)?,
            entropy: open(Measure::Entropy)?,
        })
    }

    fn append(&mut self, measure: Measure, value: &str) -> Result<()> {
        let sink = match measure {
            Measure::Energy => self.energy.as_mut(),
            Measure::Variance => self.variance.as_mut(),
            Measure::Entropy => self.entropy.as_mut(),
        };
        if let Some(sink) = sink {
            writeln!(sink, "{}", value)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        for sink in [&mut self.energy, &mut self.variance, &mut self.entropy]
            .into_iter()
            .flatten()
        {
            sink.flush()?;
        }
        Ok(())
    }
}

/// Path of a side file: the input path with `_<suffix>` appended
pub fn artifact_path(input: &Path, suffix: &str) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(format!("_{}", suffix));
    PathBuf::from(name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Band(usize),
    Total,
}

/// Report over one image
pub struct Report<'a> {
    stats: &'a ImageStatistics<'a>,
    config: &'a ReportConfig,
}

impl<'a> Report<'a> {
    /// Check the configuration against the image before any output
    pub fn new(stats: &'a ImageStatistics<'a>, config: &'a ReportConfig) -> Result<Self> {
        if config.statistic.needs_byte_samples() {
            require_byte_image(stats.buffer()).context("Statistic needs a byte image")?;
        }
        if config.statistic.needs_values() {
            rasterstat_algorithms::statistics::validate_values(&config.values)
                .context("Invalid value selection")?;
        }
        Ok(Self { stats, config })
    }

    /// Write every selected block
    pub fn write_statistics<W: Write>(&self, out: &mut W, artifacts: &mut Artifacts) -> Result<()> {
        let bands = self.stats.bands();
        let show_components = bands == 1 || self.config.totals != TotalsMode::Totals;
        let show_totals = bands > 1 && self.config.totals != TotalsMode::Components;

        if show_components {
            for z in 0..bands {
                self.write_block(out, artifacts, Scope::Band(z))?;
            }
        }
        if show_totals {
            self.write_block(out, artifacts, Scope::Total)?;
        }

        artifacts.flush()
    }

    fn write_block<W: Write>(&self, out: &mut W, artifacts: &mut Artifacts, scope: Scope) -> Result<()> {
        let statistic = self.config.statistic;
        if statistic == Statistic::None {
            return Ok(());
        }

        let long = self.config.format == OutputFormat::Long;
        if long {
            match scope {
                Scope::Band(z) => writeln!(out, "COMPONENT {}:", z)?,
                Scope::Total => writeln!(out, "TOTALS:")?,
            }
        }

        let mut fields: Vec<String> = Vec::new();

        if statistic.shows(Field::MinMax) {
            let (min, max) = match scope {
                Scope::Band(z) => self.stats.min_max(z)?,
                Scope::Total => self.stats.total_min_max(),
            };
            if long {
                writeln!(out, "  MIN         : {}", single(min))?;
                writeln!(out, "  MAX         : {}", single(max))?;
            } else {
                fields.push(single(min));
                fields.push(single(max));
            }
        }

        if statistic.shows(Field::Mean) {
            let mean = match scope {
                Scope::Band(z) => self.stats.mean(z)?,
                Scope::Total => self.stats.total_mean(),
            };
            self.scalar(out, &mut fields, "  AVERAGE     : ", single(mean))?;
        }

        if statistic.shows(Field::CenterRange) {
            let center = match scope {
                Scope::Band(z) => self.stats.center_range(z)?,
                Scope::Total => self.stats.total_center_range(),
            };
            self.scalar(out, &mut fields, "  CENTER RANGE: ", single(center))?;
        }

        match statistic {
            Statistic::ValueCounts | Statistic::ValuePercentages => {
                self.write_selected_values(out, scope)?;
            }
            Statistic::Histogram | Statistic::HistogramPercentages => {
                self.write_histogram(out, scope)?;
            }
            _ => {}
        }

        for measure in Measure::ALL {
            if !statistic.shows(Field::Measure(measure)) {
                continue;
            }
            let value = self.decimal(measure, scope)?;
            self.scalar(out, &mut fields, measure.label(), value.clone())?;
            artifacts.append(measure, &value)?;
        }

        if !long && !fields.is_empty() {
            writeln!(out, "{}", fields.join(":"))?;
        }
        Ok(())
    }

    fn scalar<W: Write>(
        &self,
        out: &mut W,
        fields: &mut Vec<String>,
        label: &str,
        value: String,
    ) -> Result<()> {
        match self.config.format {
            OutputFormat::Long => writeln!(out, "{}{}", label, value)?,
            OutputFormat::Short => fields.push(value),
        }
        Ok(())
    }

    fn decimal(&self, measure: Measure, scope: Scope) -> Result<String> {
        let value = match (measure, scope) {
            (Measure::Energy, Scope::Band(z)) => self.stats.energy(z)?,
            (Measure::Energy, Scope::Total) => self.stats.total_energy(),
            (Measure::Variance, Scope::Band(z)) => self.stats.variance(z)?,
            (Measure::Variance, Scope::Total) => self.stats.total_variance(),
            (Measure::Entropy, Scope::Band(z)) => self.stats.entropy(z)?,
            (Measure::Entropy, Scope::Total) => self.stats.total_entropy(),
        };
        Ok(self.config.decimal.format(value))
    }

    fn write_selected_values<W: Write>(&self, out: &mut W, scope: Scope) -> Result<()> {
        let values = &self.config.values;
        let pooling = self.config.pooling;

        if self.config.statistic == Statistic::ValueCounts {
            let counts = match scope {
                Scope::Band(z) => self.stats.value_counts(z, values)?,
                Scope::Total => self.stats.total_value_counts(values, pooling)?,
            };
            for (value, count) in counts {
                self.count_line(out, value, count)?;
            }
        } else {
            let shares = match scope {
                Scope::Band(z) => self.stats.value_percentages(z, values)?,
                Scope::Total => self.stats.total_value_percentages(values, pooling)?,
            };
            for (value, share) in shares {
                self.percentage_line(out, value, share)?;
            }
        }
        Ok(())
    }

    fn write_histogram<W: Write>(&self, out: &mut W, scope: Scope) -> Result<()> {
        let (hist, population) = match scope {
            Scope::Band(z) => (self.stats.histogram(z)?, self.stats.buffer().band_len()),
            Scope::Total => (
                self.stats.total_histogram(self.config.pooling)?,
                self.stats.buffer().len(),
            ),
        };

        for value in 0..BYTE_BINS {
            let value = value as u8;
            if self.config.statistic == Statistic::Histogram {
                self.count_line(out, value, hist.count(value))?;
            } else {
                self.percentage_line(out, value, hist.percentage(value, population as u64))?;
            }
        }
        Ok(())
    }

    fn count_line<W: Write>(&self, out: &mut W, value: u8, count: u64) -> Result<()> {
        match self.config.format {
            OutputFormat::Long => {
                writeln!(out, " - NUMBER OF PIXELS WITH VALUE = {} ARE {}", value, count)?
            }
            OutputFormat::Short => writeln!(out, "{} - {}", value, count)?,
        }
        Ok(())
    }

    fn percentage_line<W: Write>(&self, out: &mut W, value: u8, share: f64) -> Result<()> {
        match self.config.format {
            OutputFormat::Long => writeln!(
                out,
                " - % OF PIXELS WITH VALUE = {} ARE {}%",
                value,
                single(share)
            )?,
            OutputFormat::Short => writeln!(out, "{} - {}%", value, single(share))?,
        }
        Ok(())
    }

    /// Compressed size estimates, if a rate was requested
    pub fn rate_estimates(&self) -> Option<rasterstat_core::Result<Vec<u64>>> {
        let request = self.config.rate.as_ref()?;
        let kind = match RateKind::from_code(request.code) {
            Ok(kind) => kind?,
            Err(e) => return Some(Err(e)),
        };
        Some(
            RateEstimator::for_buffer(self.stats.buffer())
                .and_then(|est| est.estimate_all(kind, &request.values)),
        )
    }

    /// Write the rate line, or the rate error in its place
    ///
    /// Rate errors go to the report stream and do not fail the run.
    pub fn write_rate_section<W: Write>(&self, out: &mut W) -> Result<()> {
        match self.rate_estimates() {
            None => Ok(()),
            Some(Ok(estimates)) => self.write_rates(out, &estimates),
            Some(Err(e)) => {
                warn!("Rate estimation failed: {}", e);
                writeln!(out, "RATE CALCULATION ERROR: {}", e)?;
                Ok(())
            }
        }
    }

    /// Write the estimated compressed sizes on one line
    pub fn write_rates<W: Write>(&self, out: &mut W, estimates: &[u64]) -> Result<()> {
        if self.config.format == OutputFormat::Long {
            write!(out, "RATIOS NUM BYTES:")?;
        }
        for bytes in estimates {
            write!(out, " {}", bytes)?;
        }
        writeln!(out)?;
        Ok(())
    }
}

/// Single-precision rendering used for range and mean values
fn single(v: f64) -> String {
    format!("{}", v as f32)
}
