use crate::catalog::CatalogSource;
use crate::model::ThemeName;
use crate::notify::NotifySettings;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const APP_DIR: &str = "studyplanner";

// --- CLI Arguments ---

#[derive(Parser, Debug, Default)]
#[command(name = "studyplanner", about = "Class 12 study progress tracker")]
pub struct CliArgs {
    /// Catalog location: a JSON file path or an http(s) URL
    #[arg(long)]
    pub catalog: Option<String>,

    /// Subject combo to switch to at startup: PCMB, PCM, PCB, PC
    #[arg(long)]
    pub combo: Option<String>,

    /// Color theme: dark, light, solarized, gruvbox
    #[arg(short, long)]
    pub theme: Option<String>,

    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for progress, view state and logs
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

// --- Config File ---

#[derive(Debug, Deserialize, Serialize, Default, PartialEq)]
pub struct ConfigFile {
    #[serde(default)]
    pub catalog: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub notify: NotifySettings,
}

// --- Path Helpers ---

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

// --- Load Config ---

pub fn load_config(path: Option<&PathBuf>) -> ConfigFile {
    let path = path.cloned().unwrap_or_else(config_file_path);
    match fs::read_to_string(&path) {
        Ok(s) => toml::from_str(&s).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring malformed config file");
            ConfigFile::default()
        }),
        Err(_) => ConfigFile::default(),
    }
}

// --- Resolve ---

#[derive(Debug)]
pub struct ResolvedConfig {
    pub catalog: CatalogSource,
    pub combo: Option<String>,
    pub theme: ThemeName,
    pub explicit_theme: bool,
    pub data_dir: PathBuf,
    pub notify: NotifySettings,
}

impl ResolvedConfig {
    pub fn progress_db_path(&self) -> PathBuf {
        self.data_dir.join("progress.db")
    }

    pub fn view_state_path(&self) -> PathBuf {
        self.data_dir.join("view.json")
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("studyplanner.log")
    }
}

pub fn resolve(args: &CliArgs, config: &ConfigFile) -> ResolvedConfig {
    let catalog = args
        .catalog
        .as_deref()
        .or(config.catalog.as_deref())
        .map(CatalogSource::parse)
        .unwrap_or_default();

    let theme_str = args.theme.as_deref().or(config.theme.as_deref());
    let theme = ThemeName::parse(theme_str.unwrap_or("dark"));

    ResolvedConfig {
        catalog,
        combo: args.combo.clone(),
        theme,
        explicit_theme: theme_str.is_some(),
        data_dir: args.data_dir.clone().unwrap_or_else(default_data_dir),
        notify: config.notify.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_full_config_file() {
        let cfg: ConfigFile = toml::from_str(
            r#"
            catalog = "https://example.com/subjects.json"
            theme = "gruvbox"

            [notify]
            recipient = "919876543210"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.theme.as_deref(), Some("gruvbox"));
        assert_eq!(cfg.notify.recipient, "919876543210");
        assert_eq!(cfg.notify.endpoint_base, "https://wa.me");
    }

    #[test]
    fn missing_or_malformed_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert_eq!(load_config(Some(&missing)), ConfigFile::default());

        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "theme = [").unwrap();
        assert_eq!(load_config(Some(&bad)), ConfigFile::default());
    }

    #[test]
    fn cli_overrides_file() {
        let args = CliArgs {
            catalog: Some("local.json".to_string()),
            theme: Some("light".to_string()),
            data_dir: Some(PathBuf::from("/tmp/sp")),
            ..CliArgs::default()
        };
        let cfg = ConfigFile {
            catalog: Some("https://example.com/subjects.json".to_string()),
            theme: Some("solarized".to_string()),
            ..ConfigFile::default()
        };
        let resolved = resolve(&args, &cfg);
        assert_eq!(resolved.catalog, CatalogSource::File(PathBuf::from("local.json")));
        assert_eq!(resolved.theme, ThemeName::Light);
        assert!(resolved.explicit_theme);
        assert_eq!(resolved.progress_db_path(), PathBuf::from("/tmp/sp/progress.db"));
    }

    #[test]
    fn defaults_without_any_input() {
        let resolved = resolve(&CliArgs::default(), &ConfigFile::default());
        assert_eq!(resolved.catalog, CatalogSource::default());
        assert_eq!(resolved.theme, ThemeName::Dark);
        assert!(!resolved.explicit_theme);
        assert_eq!(resolved.combo, None);
    }
}
