use gopherpp::core::models::viewpoint::Approach;
use gopherpp::engine::config as core_config;

/// Values used for every design parameter that neither the config file nor the command line
/// sets. Enzymes have no default and must always be given.
pub struct DefaultsConfig {
    pub margin_size: u64,
    pub min_fragment_size: u64,
    pub max_repeat_content: f64,
    pub min_gc_content: f64,
    pub max_gc_content: f64,
    pub max_mean_kmer_alignability: f64,
    pub allow_single_margin: bool,
    pub approach: Approach,
    pub upstream_size: u64,
    pub downstream_size: u64,
    pub tiling_factor: usize,
    pub probe_length: u64,
    pub min_bait_count: usize,
    pub max_bait_count: usize,
    pub genome_build: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            margin_size: core_config::DEFAULT_MARGIN_SIZE,
            min_fragment_size: core_config::DEFAULT_MIN_FRAGMENT_SIZE,
            max_repeat_content: core_config::DEFAULT_MAX_REPEAT_CONTENT,
            min_gc_content: core_config::DEFAULT_MIN_GC_CONTENT,
            max_gc_content: core_config::DEFAULT_MAX_GC_CONTENT,
            max_mean_kmer_alignability: core_config::DEFAULT_MAX_MEAN_KMER_ALIGNABILITY,
            allow_single_margin: true,
            approach: Approach::Simple,
            upstream_size: core_config::DEFAULT_UPSTREAM_SIZE,
            downstream_size: core_config::DEFAULT_DOWNSTREAM_SIZE,
            tiling_factor: core_config::DEFAULT_TILING_FACTOR,
            probe_length: core_config::DEFAULT_PROBE_LENGTH,
            min_bait_count: core_config::DEFAULT_MIN_BAIT_COUNT,
            max_bait_count: core_config::DEFAULT_MAX_BAIT_COUNT,
            genome_build: core_config::DEFAULT_GENOME_BUILD.to_string(),
        }
    }
}
