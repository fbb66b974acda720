#[macro_use]
extern crate tracing;

mod args;
mod theme;

pub use args::Args;
pub use theme::ThemePreference;

use color_eyre::Result;
use directories::ProjectDirs;
use eyre::Context as _;
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    env,
    path::{
        Path,
        PathBuf,
    },
};

lazy_static::lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    static ref DATA_FOLDER: Option<PathBuf> = env::var(format!("{}_DATA", PROJECT_NAME.clone()))
        .ok()
        .map(PathBuf::from);
    static ref CONFIG_FOLDER: Option<PathBuf> = env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
        .ok()
        .map(PathBuf::from);
}

pub fn get_data_dir() -> PathBuf {
    if let Some(dir) = DATA_FOLDER.clone() {
        dir
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

pub fn get_config_dir() -> PathBuf {
    if let Some(dir) = CONFIG_FOLDER.clone() {
        dir
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "pitch-tank", "pitch-tank-console")
}

#[derive(Clone, Debug, Deserialize, Default, PartialEq)]
struct AppConfig {
    #[serde(default)]
    data_dir: PathBuf,
    #[serde(default)]
    config_dir: PathBuf,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(flatten, skip_serializing)]
    app_config: AppConfig,
    #[serde(default)]
    pub theme: ThemePreference,
    #[serde(default, skip_serializing)]
    pub display_name: String,
    #[serde(default, skip_serializing)]
    pub chat_open: bool,
}

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");

impl Default for Config {
    fn default() -> Self {
        serde_yml::from_str(DEFAULT_CONFIG).expect("Failed to parse default config")
    }
}

impl config::Source for Config {
    fn clone_into_box(&self) -> Box<dyn config::Source + Send + Sync> {
        Box::new((*self).clone())
    }

    fn collect(&self) -> Result<config::Map<String, config::Value>, config::ConfigError> {
        Ok(config::Map::from_iter([
            ("theme".to_string(), self.theme.to_string().into()),
            ("display_name".to_string(), self.display_name.clone().into()),
            ("chat_open".to_string(), self.chat_open.into()),
        ]))
    }
}

impl Config {
    /// Layered load: embedded defaults, then the user's `config.yaml`, then
    /// CLI args on top.
    pub fn new(args: Args) -> Result<Self, config::ConfigError> {
        let data_dir = get_data_dir();
        let config_dir = get_config_dir();
        let mut builder = config::Config::builder()
            .set_default("data_dir", data_dir.to_str().unwrap_or_default())?
            .set_default("config_dir", config_dir.to_str().unwrap_or_default())?;

        builder = builder.add_source(Config::default());

        let config_files = [("config.yaml", config::FileFormat::Yaml)];
        for (file, format) in &config_files {
            let source = config::File::from(config_dir.join(file))
                .format(*format)
                .required(false);
            builder = builder.add_source(source);
        }

        builder = builder.add_source(args);

        builder.build()?.try_deserialize()
    }

    pub fn data_dir(&self) -> &Path {
        &self.app_config.data_dir
    }

    /// Update and persist the theme preference. The theme is the only value
    /// this application ever writes back.
    pub fn set_theme(&mut self, theme: ThemePreference) -> Result<()> {
        if self.theme == theme {
            return Ok(());
        }
        info!(old = %self.theme, new = %theme, "Updating theme preference");
        self.theme = theme;
        self.save()
    }

    pub fn save(&self) -> Result<()> {
        std::fs::create_dir_all(&self.app_config.config_dir).context("Failed to create config directory")?;
        let path = self.app_config.config_dir.join("config.yaml");
        let content = serde_yml::to_string(self).context("Failed to serialize config")?;
        std::fs::write(&path, content).wrap_err_with(|| format!("Failed to write config to {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use temp_dir::TempDir;

    #[test]
    fn defaults_parse() {
        let config = Config::default();
        assert_eq!(config.theme, ThemePreference::System);
        assert_eq!(config.display_name, "Founder");
        assert!(!config.chat_open);
    }

    #[test]
    fn save_persists_only_the_theme() {
        let dir = TempDir::new().unwrap();
        let mut config = Config {
            app_config: AppConfig {
                data_dir: dir.path().to_path_buf(),
                config_dir: dir.path().to_path_buf(),
            },
            ..Config::default()
        };

        config.set_theme(ThemePreference::Dark).unwrap();

        let written = std::fs::read_to_string(dir.path().join("config.yaml")).unwrap();
        assert_eq!(written.trim(), "theme: dark");
    }

    #[test]
    fn setting_the_same_theme_does_not_rewrite_the_file() {
        let dir = TempDir::new().unwrap();
        let mut config = Config {
            app_config: AppConfig {
                data_dir: dir.path().to_path_buf(),
                config_dir: dir.path().to_path_buf(),
            },
            ..Config::default()
        };

        config.set_theme(ThemePreference::System).unwrap();
        assert!(!dir.path().join("config.yaml").exists());
    }
}
