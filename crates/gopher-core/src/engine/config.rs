use crate::core::models::enzyme::RestrictionEnzyme;
use crate::core::models::fragment::Composition;
use crate::core::models::viewpoint::Approach;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },
}

pub const DEFAULT_MARGIN_SIZE: u64 = 250;
pub const DEFAULT_MIN_FRAGMENT_SIZE: u64 = 130;
pub const DEFAULT_MAX_REPEAT_CONTENT: f64 = 0.25;
pub const DEFAULT_MIN_GC_CONTENT: f64 = 0.25;
pub const DEFAULT_MAX_GC_CONTENT: f64 = 0.65;
pub const DEFAULT_MAX_MEAN_KMER_ALIGNABILITY: f64 = 10.0;
pub const DEFAULT_UPSTREAM_SIZE: u64 = 5000;
pub const DEFAULT_DOWNSTREAM_SIZE: u64 = 5000;
pub const DEFAULT_TILING_FACTOR: usize = 1;
pub const DEFAULT_PROBE_LENGTH: u64 = 120;
pub const DEFAULT_MIN_BAIT_COUNT: usize = 1;
pub const DEFAULT_MAX_BAIT_COUNT: usize = 2;
pub const DEFAULT_GENOME_BUILD: &str = "hg38";

#[derive(Debug, Clone, PartialEq)]
pub struct DigestConfig {
    pub enzymes: Vec<RestrictionEnzyme>,
    pub margin_size: u64,
}

/// Thresholds applied to fragments, margins and baits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterConfig {
    pub min_fragment_size: u64,
    pub max_repeat_content: f64,
    pub min_gc_content: f64,
    pub max_gc_content: f64,
    pub max_mean_kmer_alignability: f64,
    pub allow_single_margin: bool,
}

impl FilterConfig {
    /// Checks an interval's composition against the repeat, GC and alignability limits.
    /// An interval without alignability data passes the alignability limit.
    pub fn accepts(&self, composition: &Composition) -> bool {
        composition.repeat <= self.max_repeat_content
            && composition.gc >= self.min_gc_content
            && composition.gc <= self.max_gc_content
            && composition
                .alignability
                .is_none_or(|value| value <= self.max_mean_kmer_alignability)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewpointConfig {
    pub approach: Approach,
    pub upstream_size: u64,
    pub downstream_size: u64,
    /// Neighbouring fragments on each side of the TSS fragment in the simple approach.
    pub tiling_factor: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaitConfig {
    pub probe_length: u64,
    pub min_bait_count: usize,
    pub max_bait_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DesignConfig {
    pub digest: DigestConfig,
    pub filters: FilterConfig,
    pub viewpoints: ViewpointConfig,
    pub baits: BaitConfig,
    pub genome_build: String,
}

#[derive(Default)]
pub struct DigestConfigBuilder {
    enzymes: Option<Vec<RestrictionEnzyme>>,
    margin_size: Option<u64>,
}

impl DigestConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enzymes(mut self, enzymes: Vec<RestrictionEnzyme>) -> Self {
        self.enzymes = Some(enzymes);
        self
    }
    pub fn margin_size(mut self, size: u64) -> Self {
        self.margin_size = Some(size);
        self
    }

    pub fn build(self) -> Result<DigestConfig, ConfigError> {
        let config = DigestConfig {
            enzymes: self
                .enzymes
                .ok_or(ConfigError::MissingParameter("enzymes"))?,
            margin_size: self.margin_size.unwrap_or(DEFAULT_MARGIN_SIZE),
        };
        validate_digest(&config)?;
        Ok(config)
    }
}

#[derive(Default)]
pub struct DesignConfigBuilder {
    enzymes: Option<Vec<RestrictionEnzyme>>,
    margin_size: Option<u64>,
    min_fragment_size: Option<u64>,
    max_repeat_content: Option<f64>,
    min_gc_content: Option<f64>,
    max_gc_content: Option<f64>,
    max_mean_kmer_alignability: Option<f64>,
    allow_single_margin: Option<bool>,
    approach: Option<Approach>,
    upstream_size: Option<u64>,
    downstream_size: Option<u64>,
    tiling_factor: Option<usize>,
    probe_length: Option<u64>,
    min_bait_count: Option<usize>,
    max_bait_count: Option<usize>,
    genome_build: Option<String>,
}

impl DesignConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder with every parameter except the enzymes set to its default.
    pub fn with_defaults() -> Self {
        Self::new()
            .margin_size(DEFAULT_MARGIN_SIZE)
            .min_fragment_size(DEFAULT_MIN_FRAGMENT_SIZE)
            .max_repeat_content(DEFAULT_MAX_REPEAT_CONTENT)
            .min_gc_content(DEFAULT_MIN_GC_CONTENT)
            .max_gc_content(DEFAULT_MAX_GC_CONTENT)
            .max_mean_kmer_alignability(DEFAULT_MAX_MEAN_KMER_ALIGNABILITY)
            .allow_single_margin(true)
            .approach(Approach::Simple)
            .upstream_size(DEFAULT_UPSTREAM_SIZE)
            .downstream_size(DEFAULT_DOWNSTREAM_SIZE)
            .tiling_factor(DEFAULT_TILING_FACTOR)
            .probe_length(DEFAULT_PROBE_LENGTH)
            .min_bait_count(DEFAULT_MIN_BAIT_COUNT)
            .max_bait_count(DEFAULT_MAX_BAIT_COUNT)
            .genome_build(DEFAULT_GENOME_BUILD)
    }

    pub fn enzymes(mut self, enzymes: Vec<RestrictionEnzyme>) -> Self {
        self.enzymes = Some(enzymes);
        self
    }
    pub fn margin_size(mut self, size: u64) -> Self {
        self.margin_size = Some(size);
        self
    }
    pub fn min_fragment_size(mut self, size: u64) -> Self {
        self.min_fragment_size = Some(size);
        self
    }
    pub fn max_repeat_content(mut self, fraction: f64) -> Self {
        self.max_repeat_content = Some(fraction);
        self
    }
    pub fn min_gc_content(mut self, fraction: f64) -> Self {
        self.min_gc_content = Some(fraction);
        self
    }
    pub fn max_gc_content(mut self, fraction: f64) -> Self {
        self.max_gc_content = Some(fraction);
        self
    }
    pub fn max_mean_kmer_alignability(mut self, value: f64) -> Self {
        self.max_mean_kmer_alignability = Some(value);
        self
    }
    pub fn allow_single_margin(mut self, allow: bool) -> Self {
        self.allow_single_margin = Some(allow);
        self
    }
    pub fn approach(mut self, approach: Approach) -> Self {
        self.approach = Some(approach);
        self
    }
    pub fn upstream_size(mut self, size: u64) -> Self {
        self.upstream_size = Some(size);
        self
    }
    pub fn downstream_size(mut self, size: u64) -> Self {
        self.downstream_size = Some(size);
        self
    }
    pub fn tiling_factor(mut self, factor: usize) -> Self {
        self.tiling_factor = Some(factor);
        self
    }
    pub fn probe_length(mut self, length: u64) -> Self {
        self.probe_length = Some(length);
        self
    }
    pub fn min_bait_count(mut self, count: usize) -> Self {
        self.min_bait_count = Some(count);
        self
    }
    pub fn max_bait_count(mut self, count: usize) -> Self {
        self.max_bait_count = Some(count);
        self
    }
    pub fn genome_build(mut self, build: impl Into<String>) -> Self {
        self.genome_build = Some(build.into());
        self
    }

    pub fn build(self) -> Result<DesignConfig, ConfigError> {
        let digest = DigestConfig {
            enzymes: self
                .enzymes
                .ok_or(ConfigError::MissingParameter("enzymes"))?,
            margin_size: self
                .margin_size
                .ok_or(ConfigError::MissingParameter("margin_size"))?,
        };
        let filters = FilterConfig {
            min_fragment_size: self
                .min_fragment_size
                .ok_or(ConfigError::MissingParameter("min_fragment_size"))?,
            max_repeat_content: self
                .max_repeat_content
                .ok_or(ConfigError::MissingParameter("max_repeat_content"))?,
            min_gc_content: self
                .min_gc_content
                .ok_or(ConfigError::MissingParameter("min_gc_content"))?,
            max_gc_content: self
                .max_gc_content
                .ok_or(ConfigError::MissingParameter("max_gc_content"))?,
            max_mean_kmer_alignability: self
                .max_mean_kmer_alignability
                .ok_or(ConfigError::MissingParameter("max_mean_kmer_alignability"))?,
            allow_single_margin: self
                .allow_single_margin
                .ok_or(ConfigError::MissingParameter("allow_single_margin"))?,
        };
        let viewpoints = ViewpointConfig {
            approach: self
                .approach
                .ok_or(ConfigError::MissingParameter("approach"))?,
            upstream_size: self
                .upstream_size
                .ok_or(ConfigError::MissingParameter("upstream_size"))?,
            downstream_size: self
                .downstream_size
                .ok_or(ConfigError::MissingParameter("downstream_size"))?,
            tiling_factor: self
                .tiling_factor
                .ok_or(ConfigError::MissingParameter("tiling_factor"))?,
        };
        let baits = BaitConfig {
            probe_length: self
                .probe_length
                .ok_or(ConfigError::MissingParameter("probe_length"))?,
            min_bait_count: self
                .min_bait_count
                .ok_or(ConfigError::MissingParameter("min_bait_count"))?,
            max_bait_count: self
                .max_bait_count
                .ok_or(ConfigError::MissingParameter("max_bait_count"))?,
        };
        let config = DesignConfig {
            digest,
            filters,
            viewpoints,
            baits,
            genome_build: self
                .genome_build
                .ok_or(ConfigError::MissingParameter("genome_build"))?,
        };
        validate_design(&config)?;
        Ok(config)
    }
}

fn invalid(parameter: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        parameter,
        reason: reason.into(),
    }
}

fn validate_digest(config: &DigestConfig) -> Result<(), ConfigError> {
    if config.enzymes.is_empty() {
        return Err(invalid("enzymes", "at least one enzyme is required"));
    }
    Ok(())
}

fn validate_fraction(parameter: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid(parameter, format!("{} is not within [0, 1]", value)));
    }
    Ok(())
}

fn validate_design(config: &DesignConfig) -> Result<(), ConfigError> {
    validate_digest(&config.digest)?;

    let filters = &config.filters;
    validate_fraction("max_repeat_content", filters.max_repeat_content)?;
    validate_fraction("min_gc_content", filters.min_gc_content)?;
    validate_fraction("max_gc_content", filters.max_gc_content)?;
    if filters.min_gc_content > filters.max_gc_content {
        return Err(invalid(
            "min_gc_content",
            format!(
                "{} exceeds max_gc_content {}",
                filters.min_gc_content, filters.max_gc_content
            ),
        ));
    }
    if filters.max_mean_kmer_alignability.is_nan() || filters.max_mean_kmer_alignability < 0.0 {
        return Err(invalid(
            "max_mean_kmer_alignability",
            "must be a non-negative number",
        ));
    }

    let baits = &config.baits;
    if baits.probe_length == 0 {
        return Err(invalid("probe_length", "must be greater than zero"));
    }
    if baits.max_bait_count == 0 {
        return Err(invalid("max_bait_count", "must be at least 1"));
    }
    if baits.min_bait_count > baits.max_bait_count {
        return Err(invalid(
            "min_bait_count",
            format!(
                "{} exceeds max_bait_count {}",
                baits.min_bait_count, baits.max_bait_count
            ),
        ));
    }

    if config.genome_build.trim().is_empty() {
        return Err(invalid("genome_build", "must not be empty"));
    }
    Ok(())
}
