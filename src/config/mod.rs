use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use popmenu_kit::components::context_menu::MenuSettings;
use popmenu_kit::surfaces::{HeadlessSurface, RowMetrics, Size};
use serde::{Deserialize, Serialize};
use toml::map::Entry;
use tracing::warn;

const LOCAL_CONFIG: &str = "popmenu_config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub viewport: Size,
    pub row_width: f32,
    pub row_height: f32,
    pub divider_height: f32,
    /// Defaults for every menu a scenario declares
    pub menu: MenuSettings,
}

static CONFIG: OnceLock<Config> = OnceLock::new();

impl Default for Config {
    fn default() -> Self {
        let metrics = RowMetrics::default();
        Self {
            viewport: Size::new(1024.0, 768.0),
            row_width: metrics.row_width,
            row_height: metrics.row_height,
            divider_height: metrics.divider_height,
            menu: MenuSettings::default(),
        }
    }
}

impl Config {
    pub fn with<R>(f: impl FnOnce(&Config) -> R) -> R {
        let config = CONFIG.get_or_init(Config::init);
        f(config)
    }

    fn init() -> Self {
        let mut merged = match toml::Value::try_from(Self::default()) {
            Ok(value) => value,
            Err(err) => {
                warn!("Default config does not serialize, skipping config files: {err}");
                return Self::default();
            }
        };

        let mut found_any_config = false;

        // Lowest to highest priority
        if let Some(system_config) = get_system_config_path() {
            found_any_config |= merge_file(&mut merged, &system_config);
        }
        if let Some(user_config) = get_user_config_path() {
            found_any_config |= merge_file(&mut merged, &user_config);
        }
        found_any_config |= merge_file(&mut merged, Path::new(LOCAL_CONFIG));

        if !found_any_config {
            tracing::debug!("No configuration file found, using default config");
        }

        let config: Config = merged.try_into().unwrap_or_else(|err| {
            warn!("Falling back to default config due to invalid overrides: {err}");
            Self::default()
        });

        tracing::info!(
            "Config initialized: viewport {}x{}",
            config.viewport.width,
            config.viewport.height
        );
        config
    }

    pub fn row_metrics(&self) -> RowMetrics {
        RowMetrics {
            row_width: self.row_width,
            row_height: self.row_height,
            divider_height: self.divider_height,
        }
    }

    /// Empty page sized and measured according to this config
    pub fn surface(&self) -> HeadlessSurface {
        HeadlessSurface::new()
            .with_viewport(self.viewport)
            .with_row_metrics(self.row_metrics())
    }
}

/// Merges `path` into `merged`; returns whether the file contributed
fn merge_file(merged: &mut toml::Value, path: &Path) -> bool {
    let Ok(content) = std::fs::read_to_string(path) else {
        return false;
    };
    match content.parse::<toml::Value>() {
        Ok(value) => {
            merge_value(merged, value);
            tracing::info!("Loaded config from {}", path.display());
            true
        }
        Err(err) => {
            warn!("Failed to parse {}: {err}", path.display());
            false
        }
    }
}

fn merge_value(base: &mut toml::Value, overrides: toml::Value) {
    match (base, overrides) {
        (toml::Value::Table(base_map), toml::Value::Table(override_map)) => {
            for (key, override_value) in override_map {
                match base_map.entry(key) {
                    Entry::Occupied(mut entry) => merge_value(entry.get_mut(), override_value),
                    Entry::Vacant(entry) => {
                        entry.insert(override_value);
                    }
                }
            }
        }
        (base_value, override_value) => {
            *base_value = override_value;
        }
    }
}

fn get_system_config_path() -> Option<PathBuf> {
    let path = PathBuf::from("/etc/popmenu/config.toml");
    if path.exists() {
        Some(path)
    } else {
        None
    }
}

fn get_user_config_path() -> Option<PathBuf> {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".config"))
        })?;

    let path = config_dir.join("popmenu").join("config.toml");
    if path.exists() {
        Some(path)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use popmenu_kit::surfaces::UiSurface;
    use serial_test::serial;
    use std::env;
    use std::fs;

    #[test]
    fn menu_defaults_match_the_widget() {
        let config = Config::default();
        assert_eq!(config.menu, MenuSettings::default());
        assert_eq!(config.menu.menu_event, "right-click");
    }

    #[test]
    fn menu_section_overrides_in_toml() {
        let overrides = r#"
            [menu]
            menu_event = "hover"
            menu_position = "aboveRight"
        "#;

        let config: Config = toml::from_str(overrides).expect("Config should deserialize");
        assert_eq!(config.menu.menu_event, "hover");
        assert_eq!(config.menu.menu_position, "aboveRight");
        assert_eq!(config.menu.menu_source, "mouse");
        assert_eq!(config.row_height, 24.0);
    }

    #[test]
    #[serial]
    fn test_get_user_config_path_with_xdg_config_home() {
        let temp_dir = tempfile::tempdir().unwrap();

        let old_xdg = env::var("XDG_CONFIG_HOME").ok();
        env::set_var("XDG_CONFIG_HOME", temp_dir.path());

        let config_dir = temp_dir.path().join("popmenu");
        fs::create_dir_all(&config_dir).unwrap();
        let config_file = config_dir.join("config.toml");
        fs::write(&config_file, "# test config").unwrap();

        let path = get_user_config_path();
        assert_eq!(path, Some(config_file));

        if let Some(old) = old_xdg {
            env::set_var("XDG_CONFIG_HOME", old);
        } else {
            env::remove_var("XDG_CONFIG_HOME");
        }
    }

    #[test]
    #[serial]
    fn test_get_user_config_path_without_file() {
        let temp_dir = tempfile::tempdir().unwrap();

        let old_xdg = env::var("XDG_CONFIG_HOME").ok();
        env::set_var("XDG_CONFIG_HOME", temp_dir.path());

        assert!(get_user_config_path().is_none());

        if let Some(old) = old_xdg {
            env::set_var("XDG_CONFIG_HOME", old);
        } else {
            env::remove_var("XDG_CONFIG_HOME");
        }
    }

    #[test]
    fn test_get_system_config_path() {
        // Only returns Some if the file exists
        if let Some(p) = get_system_config_path() {
            assert_eq!(p, PathBuf::from("/etc/popmenu/config.toml"));
        }
    }

    #[test]
    fn test_config_merge_priority() {
        let mut base =
            toml::Value::try_from(Config::default()).expect("default config is valid toml");

        let lower: toml::Value = r#"
            row_height = 30.0
            [menu]
            menu_event = "click"
        "#
        .parse()
        .unwrap();
        let higher: toml::Value = r#"
            [menu]
            menu_event = "hover"
        "#
        .parse()
        .unwrap();

        merge_value(&mut base, lower);
        merge_value(&mut base, higher);

        let config: Config = base.try_into().unwrap();
        assert_eq!(config.row_height, 30.0);
        assert_eq!(config.menu.menu_event, "hover");
        // Untouched keys of a merged table keep their defaults
        assert_eq!(config.menu.action_select_event, "click");
    }

    #[test]
    fn test_merge_file_skips_invalid_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let broken = temp_dir.path().join("broken.toml");
        fs::write(&broken, "viewport = {").unwrap();
        let valid = temp_dir.path().join("valid.toml");
        fs::write(&valid, "[viewport]\nwidth = 640.0\nheight = 480.0\n").unwrap();

        let mut merged = toml::Value::try_from(Config::default()).unwrap();
        assert!(!merge_file(&mut merged, &broken));
        assert!(!merge_file(&mut merged, &temp_dir.path().join("missing.toml")));
        assert!(merge_file(&mut merged, &valid));

        let config: Config = merged.try_into().unwrap();
        assert_eq!(config.viewport, Size::new(640.0, 480.0));
    }

    #[test]
    fn test_surface_uses_configured_viewport() {
        let config = Config {
            viewport: Size::new(800.0, 600.0),
            ..Config::default()
        };
        assert_eq!(config.surface().viewport(), Size::new(800.0, 600.0));
        assert_eq!(config.row_metrics(), RowMetrics::default());
    }
}
