mod defaults;

use crate::cli::{DesignArgs, DigestArgs, EnzymeArgs};
use crate::error::{CliError, Result};
use defaults::DefaultsConfig;
use gopherpp::core::io::enzymes::EnzymeTable;
use gopherpp::core::models::enzyme::RestrictionEnzyme;
use gopherpp::core::models::viewpoint::Approach;
use gopherpp::engine::config as core_config;
use gopherpp::engine::error::EngineError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialDigestConfig {
    enzymes: Option<Vec<String>>,
    #[serde(rename = "enzyme-table")]
    enzyme_table: Option<PathBuf>,
    #[serde(rename = "margin-size")]
    margin_size: Option<u64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialFilterConfig {
    #[serde(rename = "min-fragment-size")]
    min_fragment_size: Option<u64>,
    #[serde(rename = "max-repeat-content")]
    max_repeat_content: Option<f64>,
    #[serde(rename = "min-gc-content")]
    min_gc_content: Option<f64>,
    #[serde(rename = "max-gc-content")]
    max_gc_content: Option<f64>,
    #[serde(rename = "max-mean-kmer-alignability")]
    max_mean_kmer_alignability: Option<f64>,
    #[serde(rename = "allow-single-margin")]
    allow_single_margin: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialViewpointConfig {
    approach: Option<Approach>,
    #[serde(rename = "upstream-size")]
    upstream_size: Option<u64>,
    #[serde(rename = "downstream-size")]
    downstream_size: Option<u64>,
    #[serde(rename = "tiling-factor")]
    tiling_factor: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialBaitConfig {
    #[serde(rename = "probe-length")]
    probe_length: Option<u64>,
    #[serde(rename = "min-bait-count")]
    min_bait_count: Option<usize>,
    #[serde(rename = "max-bait-count")]
    max_bait_count: Option<usize>,
}

/// A design configuration as read from a TOML file; every value is optional.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialDesignConfig {
    digest: Option<PartialDigestConfig>,
    filters: Option<PartialFilterConfig>,
    viewpoints: Option<PartialViewpointConfig>,
    baits: Option<PartialBaitConfig>,
    #[serde(rename = "genome-build")]
    genome_build: Option<String>,
}

impl PartialDesignConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Reads the file named by `--config`, or starts from an empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Resolves the final configuration. Explicit flags override the file and `--set`
    /// values override both; anything still unset falls back to [`DefaultsConfig`].
    pub fn merge_with_cli(mut self, args: &DesignArgs) -> Result<core_config::DesignConfig> {
        self.apply_cli_flags(args);
        self.apply_set_values(&args.set_values)?;

        let defaults = DefaultsConfig::default();
        let digest = self.digest.take().unwrap_or_default();
        let filters = self.filters.take().unwrap_or_default();
        let viewpoints = self.viewpoints.take().unwrap_or_default();
        let baits = self.baits.take().unwrap_or_default();

        let enzymes = resolve_enzymes(
            digest.enzymes.as_deref(),
            digest.enzyme_table.as_deref(),
        )?;

        core_config::DesignConfigBuilder::new()
            .enzymes(enzymes)
            .margin_size(digest.margin_size.unwrap_or(defaults.margin_size))
            .min_fragment_size(
                filters
                    .min_fragment_size
                    .unwrap_or(defaults.min_fragment_size),
            )
            .max_repeat_content(
                filters
                    .max_repeat_content
                    .unwrap_or(defaults.max_repeat_content),
            )
            .min_gc_content(filters.min_gc_content.unwrap_or(defaults.min_gc_content))
            .max_gc_content(filters.max_gc_content.unwrap_or(defaults.max_gc_content))
            .max_mean_kmer_alignability(
                filters
                    .max_mean_kmer_alignability
                    .unwrap_or(defaults.max_mean_kmer_alignability),
            )
            .allow_single_margin(
                filters
                    .allow_single_margin
                    .unwrap_or(defaults.allow_single_margin),
            )
            .approach(viewpoints.approach.unwrap_or(defaults.approach))
            .upstream_size(viewpoints.upstream_size.unwrap_or(defaults.upstream_size))
            .downstream_size(
                viewpoints
                    .downstream_size
                    .unwrap_or(defaults.downstream_size),
            )
            .tiling_factor(viewpoints.tiling_factor.unwrap_or(defaults.tiling_factor))
            .probe_length(baits.probe_length.unwrap_or(defaults.probe_length))
            .min_bait_count(baits.min_bait_count.unwrap_or(defaults.min_bait_count))
            .max_bait_count(baits.max_bait_count.unwrap_or(defaults.max_bait_count))
            .genome_build(self.genome_build.unwrap_or(defaults.genome_build))
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    fn apply_cli_flags(&mut self, args: &DesignArgs) {
        let digest = self.digest.get_or_insert_with(Default::default);
        if !args.enzymes.enzymes.is_empty() {
            digest.enzymes = Some(args.enzymes.enzymes.clone());
        }
        if let Some(table) = &args.enzymes.enzyme_table {
            digest.enzyme_table = Some(table.clone());
        }
        if let Some(size) = args.margin_size {
            digest.margin_size = Some(size);
        }

        let filters = self.filters.get_or_insert_with(Default::default);
        if let Some(size) = args.min_fragment_size {
            filters.min_fragment_size = Some(size);
        }
        if args.single_margin.allow_single_margin {
            filters.allow_single_margin = Some(true);
        } else if args.single_margin.require_both_margins {
            filters.allow_single_margin = Some(false);
        }

        let viewpoints = self.viewpoints.get_or_insert_with(Default::default);
        if let Some(approach) = args.approach {
            viewpoints.approach = Some(approach);
        }
        if let Some(size) = args.upstream_size {
            viewpoints.upstream_size = Some(size);
        }
        if let Some(size) = args.downstream_size {
            viewpoints.downstream_size = Some(size);
        }
        if let Some(factor) = args.tiling_factor {
            viewpoints.tiling_factor = Some(factor);
        }

        let baits = self.baits.get_or_insert_with(Default::default);
        if let Some(length) = args.probe_length {
            baits.probe_length = Some(length);
        }
        if let Some(count) = args.max_bait_count {
            baits.max_bait_count = Some(count);
        }

        if let Some(build) = &args.genome_build {
            self.genome_build = Some(build.clone());
        }
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value_str) = kv_pair.split_once('=').ok_or_else(|| {
                CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                ))
            })?;
            let key = key.trim();
            let value_str = value_str.trim();

            match key {
                "digest.enzymes" => {
                    self.digest.get_or_insert_with(Default::default).enzymes = Some(
                        value_str
                            .split(',')
                            .map(str::trim)
                            .filter(|name| !name.is_empty())
                            .map(str::to_string)
                            .collect(),
                    );
                }
                "digest.enzyme-table" => {
                    self.digest.get_or_insert_with(Default::default).enzyme_table =
                        Some(PathBuf::from(value_str));
                }
                "digest.margin-size" => {
                    self.digest.get_or_insert_with(Default::default).margin_size =
                        Some(parse_value(key, value_str)?);
                }
                "filters.min-fragment-size" => {
                    self.filters
                        .get_or_insert_with(Default::default)
                        .min_fragment_size = Some(parse_value(key, value_str)?);
                }
                "filters.max-repeat-content" => {
                    self.filters
                        .get_or_insert_with(Default::default)
                        .max_repeat_content = Some(parse_value(key, value_str)?);
                }
                "filters.min-gc-content" => {
                    self.filters
                        .get_or_insert_with(Default::default)
                        .min_gc_content = Some(parse_value(key, value_str)?);
                }
                "filters.max-gc-content" => {
                    self.filters
                        .get_or_insert_with(Default::default)
                        .max_gc_content = Some(parse_value(key, value_str)?);
                }
                "filters.max-mean-kmer-alignability" => {
                    self.filters
                        .get_or_insert_with(Default::default)
                        .max_mean_kmer_alignability = Some(parse_value(key, value_str)?);
                }
                "filters.allow-single-margin" => {
                    self.filters
                        .get_or_insert_with(Default::default)
                        .allow_single_margin = Some(parse_value(key, value_str)?);
                }
                "viewpoints.approach" => {
                    self.viewpoints
                        .get_or_insert_with(Default::default)
                        .approach = Some(parse_value(key, value_str)?);
                }
                "viewpoints.upstream-size" => {
                    self.viewpoints
                        .get_or_insert_with(Default::default)
                        .upstream_size = Some(parse_value(key, value_str)?);
                }
                "viewpoints.downstream-size" => {
                    self.viewpoints
                        .get_or_insert_with(Default::default)
                        .downstream_size = Some(parse_value(key, value_str)?);
                }
                "viewpoints.tiling-factor" => {
                    self.viewpoints
                        .get_or_insert_with(Default::default)
                        .tiling_factor = Some(parse_value(key, value_str)?);
                }
                "baits.probe-length" => {
                    self.baits.get_or_insert_with(Default::default).probe_length =
                        Some(parse_value(key, value_str)?);
                }
                "baits.min-bait-count" => {
                    self.baits.get_or_insert_with(Default::default).min_bait_count =
                        Some(parse_value(key, value_str)?);
                }
                "baits.max-bait-count" => {
                    self.baits.get_or_insert_with(Default::default).max_bait_count =
                        Some(parse_value(key, value_str)?);
                }
                "genome-build" => {
                    self.genome_build = Some(value_str.to_string());
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value_str: &str) -> Result<T> {
    value_str.parse().map_err(|_| {
        CliError::Config(format!("Invalid value for {}: {}", key, value_str))
    })
}

/// Builds the configuration of the `digest` command from its flags.
pub fn digest_config(args: &DigestArgs) -> Result<core_config::DigestConfig> {
    let enzymes = resolve_cli_enzymes(&args.enzymes)?;
    core_config::DigestConfigBuilder::new()
        .enzymes(enzymes)
        .margin_size(
            args.margin_size
                .unwrap_or(DefaultsConfig::default().margin_size),
        )
        .build()
        .map_err(|e| CliError::Config(e.to_string()))
}

pub fn resolve_cli_enzymes(args: &EnzymeArgs) -> Result<Vec<RestrictionEnzyme>> {
    let names = (!args.enzymes.is_empty()).then_some(args.enzymes.as_slice());
    resolve_enzymes(names, args.enzyme_table.as_deref())
}

/// Looks enzyme names up in the given table, or in the built-in catalogue without one.
pub fn enzyme_table(path: Option<&Path>) -> Result<EnzymeTable> {
    match path {
        Some(path) => Ok(EnzymeTable::load(path).map_err(EngineError::from)?),
        None => Ok(EnzymeTable::builtin()),
    }
}

fn resolve_enzymes(
    names: Option<&[String]>,
    table_path: Option<&Path>,
) -> Result<Vec<RestrictionEnzyme>> {
    let names = names.filter(|names| !names.is_empty()).ok_or_else(|| {
        CliError::Config(
            "At least one restriction enzyme is required, via --enzyme or `digest.enzymes`."
                .to_string(),
        )
    })?;
    let table = enzyme_table(table_path)?;
    Ok(table.resolve(names).map_err(EngineError::from)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use once_cell::sync::Lazy;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    static TEST_DIR: Lazy<TempDir> = Lazy::new(|| tempdir().expect("Failed to create temp dir"));

    fn write_config_file(name: &str, content: &str) -> PathBuf {
        let file_path = TEST_DIR.path().join(name);
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn design_args(extra: &[&str]) -> DesignArgs {
        let mut args = vec![
            "gopher", "design", "-g", "genome.fa", "-t", "refGene.txt", "-o", "out",
        ];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Commands::Design(args) => args,
            _ => panic!("Expected 'design' subcommand"),
        }
    }

    fn merge(config_path: Option<&Path>, args: &DesignArgs) -> Result<core_config::DesignConfig> {
        PartialDesignConfig::load(config_path)?.merge_with_cli(args)
    }

    #[test]
    fn file_values_fill_in_over_defaults() {
        let config_path = write_config_file(
            "config_file.toml",
            r#"
            genome-build = "hg19"

            [digest]
            enzymes = ["DpnII"]
            margin-size = 200

            [viewpoints]
            approach = "extended"
            upstream-size = 2000
            "#,
        );
        let args = design_args(&[]);
        let config = merge(Some(&config_path), &args).unwrap();

        assert_eq!(config.digest.enzymes.len(), 1);
        assert_eq!(config.digest.enzymes[0].name(), "DpnII");
        assert_eq!(config.digest.margin_size, 200);
        assert_eq!(config.viewpoints.approach, Approach::Extended);
        assert_eq!(config.viewpoints.upstream_size, 2000);
        assert_eq!(
            config.viewpoints.downstream_size,
            core_config::DEFAULT_DOWNSTREAM_SIZE
        );
        assert_eq!(config.baits.probe_length, core_config::DEFAULT_PROBE_LENGTH);
        assert_eq!(config.genome_build, "hg19");
        assert!(config.filters.allow_single_margin);
    }

    #[test]
    fn cli_flags_override_file_values() {
        let config_path = write_config_file(
            "config_flags.toml",
            r#"
            [digest]
            enzymes = ["DpnII"]
            margin-size = 200

            [filters]
            allow-single-margin = true
            "#,
        );
        let args = design_args(&[
            "-e",
            "HindIII,DpnII",
            "-m",
            "300",
            "--require-both-margins",
            "--probe-length",
            "80",
        ]);
        let config = merge(Some(&config_path), &args).unwrap();

        let names: Vec<&str> = config.digest.enzymes.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["HindIII", "DpnII"]);
        assert_eq!(config.digest.margin_size, 300);
        assert!(!config.filters.allow_single_margin);
        assert_eq!(config.baits.probe_length, 80);
    }

    #[test]
    fn set_values_override_flags_and_file() {
        let config_path = write_config_file(
            "config_set.toml",
            r#"
            [digest]
            enzymes = ["HindIII"]

            [baits]
            max-bait-count = 4
            "#,
        );
        let args = design_args(&[
            "--probe-length",
            "80",
            "-S",
            "baits.probe-length=100",
            "-S",
            "viewpoints.approach=extended",
            "-S",
            "filters.max-gc-content=0.7",
        ]);
        let config = merge(Some(&config_path), &args).unwrap();

        assert_eq!(config.baits.probe_length, 100);
        assert_eq!(config.baits.max_bait_count, 4);
        assert_eq!(config.viewpoints.approach, Approach::Extended);
        assert_eq!(config.filters.max_gc_content, 0.7);
    }

    #[test]
    fn missing_enzymes_is_a_config_error() {
        let args = design_args(&[]);
        let result = merge(None, &args);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("enzyme")));
    }

    #[test]
    fn unknown_enzyme_is_reported_by_the_core() {
        let args = design_args(&["-e", "NotAnEnzyme"]);
        let result = merge(None, &args);
        assert!(matches!(result, Err(CliError::GopherCore(_))));
    }

    #[test]
    fn unknown_set_key_and_bad_value_are_rejected() {
        let args = design_args(&["-e", "DpnII", "-S", "baits.colour=red"]);
        assert!(matches!(merge(None, &args), Err(CliError::Config(_))));

        let args = design_args(&["-e", "DpnII", "-S", "baits.probe-length=long"]);
        assert!(matches!(merge(None, &args), Err(CliError::Config(_))));

        let args = design_args(&["-e", "DpnII", "-S", "no-equals-sign"]);
        assert!(matches!(merge(None, &args), Err(CliError::Config(_))));
    }

    #[test]
    fn invalid_ranges_are_config_errors() {
        let args = design_args(&["-e", "DpnII", "-S", "filters.min-gc-content=0.9"]);
        assert!(matches!(merge(None, &args), Err(CliError::Config(_))));
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let config_path = write_config_file(
            "config_unknown.toml",
            r#"
            [digest]
            enzymes = ["DpnII"]
            cutter = "fast"
            "#,
        );
        let result = PartialDesignConfig::from_file(&config_path);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn enzymes_resolve_against_a_custom_table() {
        let table_path = write_config_file("enzymes.tsv", "name\tsite\nMyCutter\tGG^CC\n");
        let args = design_args(&[
            "-e",
            "MyCutter",
            "--enzyme-table",
            table_path.to_str().unwrap(),
        ]);
        let config = merge(None, &args).unwrap();
        assert_eq!(config.digest.enzymes[0].name(), "MyCutter");
        assert_eq!(config.digest.enzymes[0].site(), "GG^CC");
    }

    #[test]
    fn digest_config_uses_default_margin() {
        let cli = Cli::parse_from(["gopher", "digest", "-g", "g.fa", "-o", "d.tsv", "-e", "DpnII"]);
        let Commands::Digest(args) = cli.command else {
            panic!("Expected 'digest' subcommand");
        };
        let config = digest_config(&args).unwrap();
        assert_eq!(config.margin_size, core_config::DEFAULT_MARGIN_SIZE);
        assert_eq!(config.enzymes[0].name(), "DpnII");
    }
}
