//! Configuration management

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::collision::HitTuning;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub board: BoardConfig,

    #[serde(default)]
    pub grid: GridConfig,

    #[serde(default)]
    pub tuning: HitTuning,

    #[serde(default)]
    pub activation: ActivationConfig,
}

fn default_port() -> u16 {
    8090
}

#[derive(Debug, Deserialize)]
pub struct BoardConfig {
    /// Seed a small demo board when nothing is persisted yet (default
    /// true). Installs that provision board.json out of band turn it off.
    #[serde(default = "default_seed_demo")]
    pub seed_demo: bool,
}

fn default_seed_demo() -> bool {
    true
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self { seed_demo: true }
    }
}

/// Grid cell metrics. The board page lays its cells out from these, so
/// the rects it measures back for hit-testing are deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub cell_px: f64,
    pub gap_px: f64,
    pub desktop_columns: usize,
    pub mobile_columns: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_px: 100.0,
            gap_px: 16.0,
            desktop_columns: 8,
            mobile_columns: 4,
        }
    }
}

/// Drag activation delays per input class. Touch gets a long-press window
/// so scrolling does not start drags; mouse pointers start immediately.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivationConfig {
    pub touch_delay_ms: u64,
    pub pointer_delay_ms: u64,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            touch_delay_ms: 100,
            pointer_delay_ms: 0,
        }
    }
}

/// The slice of server config the web client runs on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub grid: GridConfig,
    pub tuning: HitTuning,
    pub activation: ActivationConfig,
}

impl Config {
    pub fn client(&self) -> ClientConfig {
        ClientConfig {
            grid: self.grid,
            tuning: self.tuning,
            activation: self.activation,
        }
    }
}

/// Get config directory (XDG_CONFIG_HOME or platform default)
pub fn get_config_dir() -> std::path::PathBuf {
    if let Ok(dir) = std::env::var("HOMEGRID_CONFIG_DIR") {
        return std::path::PathBuf::from(dir);
    }

    #[cfg(target_os = "macos")]
    {
        if let Ok(home) = std::env::var("HOME") {
            return std::path::PathBuf::from(home).join("Library/Application Support/homegrid");
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            return std::path::PathBuf::from(xdg).join("homegrid");
        }
        if let Ok(home) = std::env::var("HOME") {
            return std::path::PathBuf::from(home).join(".config/homegrid");
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return std::path::PathBuf::from(appdata).join("homegrid");
        }
    }

    // Fallback to current directory
    std::path::PathBuf::from(".")
}

/// Get data directory (XDG_DATA_HOME or platform default)
pub fn get_data_dir() -> std::path::PathBuf {
    if let Ok(dir) = std::env::var("HOMEGRID_DATA_DIR") {
        return std::path::PathBuf::from(dir);
    }
    // Node.js deployments used DATA_DIR for the same directory
    if let Ok(dir) = std::env::var("DATA_DIR") {
        return std::path::PathBuf::from(dir);
    }

    #[cfg(target_os = "macos")]
    {
        if let Ok(home) = std::env::var("HOME") {
            return std::path::PathBuf::from(home).join("Library/Application Support/homegrid");
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            return std::path::PathBuf::from(xdg).join("homegrid");
        }
        if let Ok(home) = std::env::var("HOME") {
            return std::path::PathBuf::from(home).join(".local/share/homegrid");
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("LOCALAPPDATA") {
            return std::path::PathBuf::from(appdata).join("homegrid");
        }
    }

    // Fallback to ./data
    std::path::PathBuf::from("./data")
}

pub fn load_config() -> Result<Config> {
    let config_dir = get_config_dir();

    let mut builder = ::config::Config::builder()
        // Start with defaults
        .set_default("port", 8090)?
        // Load from config file if it exists
        .add_source(
            ::config::File::with_name(&config_dir.join("config").to_string_lossy()).required(false),
        )
        // Override with environment variables (HOMEGRID_PORT, HOMEGRID_GRID__CELL_PX, etc.)
        .add_source(
            ::config::Environment::with_prefix("HOMEGRID")
                .separator("__")
                .try_parsing(true),
        );

    // Support PORT env vars with explicit precedence: HOMEGRID_PORT > PORT > config > default
    // Handle manually to ensure consistent behavior across all environments
    if let Ok(port) = std::env::var("HOMEGRID_PORT") {
        if let Ok(port_num) = port.parse::<u16>() {
            builder = builder.set_override("port", port_num as i64)?;
        }
    } else if let Ok(port) = std::env::var("PORT") {
        // Legacy PORT fallback (Node.js deployments, Docker)
        if let Ok(port_num) = port.parse::<u16>() {
            builder = builder.set_override("port", port_num as i64)?;
        }
    }

    let config = builder.build()?;

    Ok(config.try_deserialize()?)
}

/// Migrate the Node.js board file to the Rust name on startup
///
/// The Node.js version persisted the board as dashboard.json; the Rust
/// server reads board.json. Runs once at startup, never overwrites an
/// existing board.json.
pub fn migrate_legacy_board() {
    let data_dir = get_data_dir();

    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::warn!("Failed to create data directory: {}", e);
        return;
    }

    let legacy_path = data_dir.join("dashboard.json");
    let board_path = data_dir.join("board.json");

    if !legacy_path.exists() {
        return;
    }
    if board_path.exists() {
        tracing::debug!("Skipping board migration (board.json already exists)");
        return;
    }

    match std::fs::rename(&legacy_path, &board_path) {
        Ok(()) => {
            tracing::info!("Migrated board file: dashboard.json -> board.json");
        }
        Err(e) => {
            // If rename fails (e.g., cross-device), try copy + delete
            match std::fs::read(&legacy_path) {
                Ok(content) => {
                    if let Err(e) = std::fs::write(&board_path, &content) {
                        tracing::warn!("Failed to write migrated board: {}", e);
                        return;
                    }
                    if let Err(e) = std::fs::remove_file(&legacy_path) {
                        tracing::warn!("Migrated board but failed to remove original: {}", e);
                    } else {
                        tracing::info!("Migrated board file (copy): dashboard.json -> board.json");
                    }
                }
                Err(_) => {
                    tracing::warn!("Failed to migrate board file: {}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    #[serial]
    fn test_port_env_fallback() {
        // PORT env var should work as fallback when HOMEGRID_PORT is not set
        env::remove_var("HOMEGRID_PORT");
        env::remove_var("PORT");
        env::set_var("HOMEGRID_CONFIG_DIR", "/tmp/homegrid-test-nonexistent");

        env::set_var("PORT", "3000");

        let config = load_config().expect("config should load");

        env::remove_var("PORT");
        env::remove_var("HOMEGRID_CONFIG_DIR");

        assert_eq!(config.port, 3000, "PORT env var should set config.port");
    }

    #[test]
    #[serial]
    fn test_homegrid_port_takes_precedence_over_port() {
        env::remove_var("HOMEGRID_PORT");
        env::remove_var("PORT");
        env::set_var("HOMEGRID_CONFIG_DIR", "/tmp/homegrid-test-nonexistent");

        // Set both - HOMEGRID_PORT should win
        env::set_var("HOMEGRID_PORT", "5000");
        env::set_var("PORT", "3000");

        let config = load_config().expect("config should load");

        env::remove_var("HOMEGRID_PORT");
        env::remove_var("PORT");
        env::remove_var("HOMEGRID_CONFIG_DIR");

        assert_eq!(
            config.port, 5000,
            "HOMEGRID_PORT should take precedence over PORT"
        );
    }

    #[test]
    #[serial]
    fn test_invalid_port_uses_default() {
        env::remove_var("HOMEGRID_PORT");
        env::remove_var("PORT");
        env::set_var("HOMEGRID_CONFIG_DIR", "/tmp/homegrid-test-nonexistent");

        env::set_var("PORT", "not-a-number");

        let config = load_config().expect("config should load");

        env::remove_var("PORT");
        env::remove_var("HOMEGRID_CONFIG_DIR");

        assert_eq!(config.port, 8090, "Invalid PORT should fall back to default");
    }

    #[test]
    #[serial]
    fn test_tuning_and_grid_defaults() {
        env::remove_var("HOMEGRID_PORT");
        env::remove_var("PORT");
        env::set_var("HOMEGRID_CONFIG_DIR", "/tmp/homegrid-test-nonexistent");

        let config = load_config().expect("config should load");

        env::remove_var("HOMEGRID_CONFIG_DIR");

        assert_eq!(config.tuning.group_hit_margin_px, 10.0);
        assert_eq!(config.tuning.group_coverage_min, 0.3);
        assert_eq!(config.tuning.reorder_coverage_min, 0.5);
        assert_eq!(config.grid.desktop_columns, 8);
        assert_eq!(config.activation.touch_delay_ms, 100);
        assert_eq!(config.activation.pointer_delay_ms, 0);
        assert!(config.board.seed_demo);
    }

    #[test]
    fn test_seed_demo_defaults_on() {
        // A first run with no config file must seed; an absent [board]
        // table or an absent seed_demo key both mean "on".
        assert!(BoardConfig::default().seed_demo);

        let board: BoardConfig = serde_json::from_str("{}").expect("empty table");
        assert!(board.seed_demo);

        let board: BoardConfig =
            serde_json::from_str(r#"{"seed_demo": false}"#).expect("explicit off");
        assert!(!board.seed_demo);
    }

    #[test]
    #[serial]
    fn test_migrate_legacy_board_renames_file() {
        let temp_dir = tempfile::tempdir().expect("create temp dir");
        std::fs::write(temp_dir.path().join("dashboard.json"), r#"{"desktop":[]}"#)
            .expect("write legacy");

        env::set_var("HOMEGRID_DATA_DIR", temp_dir.path());

        migrate_legacy_board();

        env::remove_var("HOMEGRID_DATA_DIR");

        assert!(temp_dir.path().join("board.json").exists());
        assert!(!temp_dir.path().join("dashboard.json").exists());
    }

    #[test]
    #[serial]
    fn test_migration_never_overwrites_board() {
        let temp_dir = tempfile::tempdir().expect("create temp dir");
        std::fs::write(temp_dir.path().join("dashboard.json"), r#"{"legacy":true}"#)
            .expect("write legacy");
        std::fs::write(temp_dir.path().join("board.json"), r#"{"current":true}"#)
            .expect("write current");

        env::set_var("HOMEGRID_DATA_DIR", temp_dir.path());

        migrate_legacy_board();

        env::remove_var("HOMEGRID_DATA_DIR");

        let content =
            std::fs::read_to_string(temp_dir.path().join("board.json")).expect("read board");
        assert!(content.contains("current"), "board.json should stay intact");
    }
}
