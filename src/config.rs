use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use eyre::{eyre, WrapErr};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, info, warn};

use crate::{catalog::Catalog, engines::Engine};

/// Where the config is read from when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "pdfsearch.toml";

#[derive(Deserialize, Debug, Default)]
pub struct Config {
    #[serde(default)]
    pub engine: Option<Engine>,
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    #[serde(default)]
    pub user_agents: Vec<String>,
    #[serde(default)]
    pub engines: EnginesConfig,
    #[serde(default)]
    pub catalog: Catalog,
}

#[derive(Deserialize, Debug, Default)]
pub struct EnginesConfig {
    /// Per-engine configs. These are parsed at request time.
    #[serde(flatten)]
    pub map: HashMap<Engine, toml::Table>,
}

impl Config {
    /// The config that's compiled into the binary. Every user config is
    /// merged over this one.
    pub fn base() -> eyre::Result<Self> {
        let base_config_str = include_str!("../config-base.toml");
        toml::from_str(base_config_str).wrap_err("invalid base config")
    }

    pub fn read(config_path: &Path) -> eyre::Result<Self> {
        let mut config = Self::base()?;

        if !config_path.exists() {
            if is_default_path(config_path) {
                debug!("No config found at {config_path:?}, using the defaults");
            } else {
                warn!("No config found at {config_path:?}, using the defaults");
            }
            return Ok(config);
        }

        info!("Reading config from {config_path:?}");
        let given_config_str = fs::read_to_string(config_path)
            .wrap_err_with(|| format!("couldn't read config at {config_path:?}"))?;
        let given_config = toml::from_str::<Config>(&given_config_str)
            .wrap_err_with(|| format!("couldn't parse config at {config_path:?}"))?;
        config.update(given_config);
        Ok(config)
    }

    // Update the current config with the given config. This is used to make it so
    // the config-base.toml is always used as a fallback if the user decides to
    // use the default for something.
    pub fn update(&mut self, new: Config) {
        self.engine = new.engine.or(self.engine);
        self.download_dir = new.download_dir.or(self.download_dir.take());
        if !new.user_agents.is_empty() {
            self.user_agents = new.user_agents;
        }
        for (engine, table) in new.engines.map {
            self.engines.map.entry(engine).or_default().extend(table);
        }
        self.catalog.update(new.catalog);
    }

    pub fn engine(&self) -> Engine {
        self.engine.unwrap_or(Engine::DuckDuckGo)
    }

    pub fn download_dir(&self) -> &Path {
        self.download_dir
            .as_deref()
            .unwrap_or_else(|| Path::new("downloads"))
    }
}

/// A missing config is only worth mentioning if the user asked for a specific
/// one.
fn is_default_path(config_path: &Path) -> bool {
    config_path == Path::new(DEFAULT_CONFIG_PATH)
}

impl EnginesConfig {
    pub fn get<T: DeserializeOwned>(&self, engine: Engine) -> eyre::Result<T> {
        let table = self
            .map
            .get(&engine)
            .cloned()
            .ok_or_else(|| eyre!("engine {engine} isn't configured"))?;
        toml::Value::Table(table)
            .try_into()
            .wrap_err_with(|| format!("invalid config for engine {engine}"))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn base_config_has_defaults() {
        let config = Config::base().unwrap();
        assert_eq!(config.engine(), Engine::DuckDuckGo);
        assert_eq!(config.download_dir(), Path::new("downloads"));
        assert!(!config.user_agents.is_empty());
        assert!(config.catalog.get("algorithms").is_some());
    }

    #[test]
    fn every_engine_is_configured() {
        let config = Config::base().unwrap();
        for engine in Engine::all() {
            assert!(
                config.engines.map.contains_key(engine),
                "{engine} has no config table"
            );
        }
    }

    #[test]
    fn update_merges_engine_tables() {
        let mut config = Config::base().unwrap();
        let given: Config = toml::from_str(
            r#"
            engine = "brave"

            [engines.duckduckgo]
            url = "http://localhost:1234/html/"
            "#,
        )
        .unwrap();
        config.update(given);

        assert_eq!(config.engine(), Engine::Brave);
        let table = &config.engines.map[&Engine::DuckDuckGo];
        assert_eq!(table["url"].as_str(), Some("http://localhost:1234/html/"));
        // keys the user didn't set come from the base config
        assert_eq!(table["result"].as_str(), Some(".result"));
        assert_eq!(config.download_dir(), Path::new("downloads"));
    }

    #[test]
    fn update_keeps_user_agents_unless_given() {
        let mut config = Config::base().unwrap();
        let count = config.user_agents.len();
        config.update(Config::default());
        assert_eq!(config.user_agents.len(), count);

        config.update(Config {
            user_agents: vec!["test/1.0".to_string()],
            ..Default::default()
        });
        assert_eq!(config.user_agents, vec!["test/1.0".to_string()]);
    }

    #[test]
    fn unknown_engine_is_rejected() {
        let res = toml::from_str::<Config>(r#"engine = "altavista""#);
        assert!(res.is_err());
    }

    #[test]
    fn read_missing_file_uses_base() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::read(&dir.path().join("pdfsearch.toml")).unwrap();
        assert_eq!(config.engine(), Engine::DuckDuckGo);
    }

    #[test]
    fn only_the_default_path_is_default() {
        assert!(is_default_path(Path::new(DEFAULT_CONFIG_PATH)));
        assert!(!is_default_path(Path::new("pdfsearh.toml")));
        assert!(!is_default_path(Path::new("conf/pdfsearch.toml")));
    }

    #[test]
    fn read_missing_explicit_file_uses_base() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::read(&dir.path().join("typo.toml")).unwrap();
        assert_eq!(config.download_dir(), Path::new("downloads"));
    }

    #[test]
    fn read_merges_user_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            download_dir = "books"

            [catalog]
            rust = ["The Rust Programming Language"]
            "#
        )
        .unwrap();

        let config = Config::read(file.path()).unwrap();
        assert_eq!(config.download_dir(), Path::new("books"));
        assert_eq!(
            config.catalog.get("rust").unwrap(),
            ["The Rust Programming Language".to_string()]
        );
        assert!(config.catalog.get("algorithms").is_some());
    }

    #[test]
    fn read_invalid_file_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "engine = [").unwrap();
        assert!(Config::read(file.path()).is_err());
    }
}
