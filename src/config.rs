#![allow(dead_code)]

use std::path::PathBuf;

pub const DEFAULT_DATASET_PATH: &str = "data/pokemon_cache.json";
pub const DEFAULT_EXPORT_DIR: &str = ".";
pub const DEFAULT_HMA_STATS_PATH: &str = "pokemon.stats.txt";
pub const DEFAULT_HMA_ABILITIES_PATH: &str = "abilities.names.txt";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorConfig {
    pub dataset_path: PathBuf,
    pub export_dir: PathBuf,
    /// Earlier export to resume editing from.
    pub overrides_path: Option<PathBuf>,
    /// HMA dump of `data.pokemon.stats` that the patch export rewrites.
    pub hma_stats_path: PathBuf,
    pub hma_abilities_path: PathBuf,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            export_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
            overrides_path: None,
            hma_stats_path: PathBuf::from(DEFAULT_HMA_STATS_PATH),
            hma_abilities_path: PathBuf::from(DEFAULT_HMA_ABILITIES_PATH),
        }
    }
}

#[derive(Clone, Debug, clap::Args)]
pub struct ConfigArgs {
    /// Record dataset to edit
    #[arg(long, env = "CREATURE_EDITOR_DATASET", default_value = DEFAULT_DATASET_PATH)]
    pub dataset: PathBuf,
    /// Directory exports are written to
    #[arg(long, env = "CREATURE_EDITOR_EXPORT_DIR", default_value = DEFAULT_EXPORT_DIR)]
    pub export_dir: PathBuf,
    /// Previously exported edits to load on startup
    #[arg(long, env = "CREATURE_EDITOR_OVERRIDES")]
    pub overrides: Option<PathBuf>,
    /// HMA stats table dump used by the patch export
    #[arg(long, env = "CREATURE_EDITOR_HMA_STATS", default_value = DEFAULT_HMA_STATS_PATH)]
    pub hma_stats: PathBuf,
    /// HMA ability name list used by the patch export
    #[arg(long, env = "CREATURE_EDITOR_HMA_ABILITIES", default_value = DEFAULT_HMA_ABILITIES_PATH)]
    pub hma_abilities: PathBuf,
}

impl From<ConfigArgs> for EditorConfig {
    fn from(args: ConfigArgs) -> Self {
        Self {
            dataset_path: args.dataset,
            export_dir: args.export_dir,
            overrides_path: args.overrides,
            hma_stats_path: args.hma_stats,
            hma_abilities_path: args.hma_abilities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: ConfigArgs,
    }

    #[test]
    fn explicit_args_override_defaults() {
        let cli = TestCli::parse_from([
            "test",
            "--dataset",
            "other.json",
            "--export-dir",
            "out",
            "--overrides",
            "custom_pokemon.json",
            "--hma-stats",
            "rom/pokemon.stats.txt",
        ]);
        let config = EditorConfig::from(cli.config);
        assert_eq!(config.dataset_path, PathBuf::from("other.json"));
        assert_eq!(config.export_dir, PathBuf::from("out"));
        assert_eq!(config.overrides_path, Some(PathBuf::from("custom_pokemon.json")));
        assert_eq!(config.hma_stats_path, PathBuf::from("rom/pokemon.stats.txt"));
    }

    #[test]
    fn default_config_points_at_bundled_dataset() {
        let config = EditorConfig::default();
        assert_eq!(config.dataset_path, PathBuf::from(DEFAULT_DATASET_PATH));
        assert_eq!(config.overrides_path, None);
        assert_eq!(config.hma_abilities_path, PathBuf::from(DEFAULT_HMA_ABILITIES_PATH));
    }
}
