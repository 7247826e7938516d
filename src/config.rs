/*
 * This file is part of sensectl.
 *
 * Copyright (C) 2025 sensectl contributors
 *
 * sensectl is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * sensectl is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with sensectl. If not, see <https://www.gnu.org/licenses/>.
 */

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SenseError};

pub const DEFAULT_MODULE_NAME: &str = "linuwu_sense";
pub const DEFAULT_MODULE_PATH: &str = "~/Linuwu-Sense/src/linuwu_sense.ko";
pub const DEFAULT_SYSFS_BASE: &str =
    "/sys/module/linuwu_sense/drivers/platform:acer-wmi/acer-wmi/predator_sense";

fn default_module_name() -> String { DEFAULT_MODULE_NAME.to_string() }
fn default_module_path() -> String { DEFAULT_MODULE_PATH.to_string() }
fn default_sysfs_base() -> PathBuf { PathBuf::from(DEFAULT_SYSFS_BASE) }

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SenseConfig {
    #[serde(default = "default_module_name")]
    pub module_name: String,
    /// Path to the built .ko; a leading `~` is the invoking user's home.
    #[serde(default = "default_module_path")]
    pub module_path: String,
    /// Directory holding the predator_sense attribute files
    #[serde(default = "default_sysfs_base")]
    pub sysfs_base: PathBuf,
}

impl Default for SenseConfig {
    fn default() -> Self {
        Self {
            module_name: default_module_name(),
            module_path: default_module_path(),
            sysfs_base: default_sysfs_base(),
        }
    }
}

impl SenseConfig {
    pub fn module_file(&self) -> PathBuf {
        expand_home(&self.module_path, invoking_user_home().as_deref())
    }
}

/// Config file locations in lookup order. Unset variables are skipped.
pub fn config_candidates() -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(3);
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        paths.push(Path::new(&xdg).join("sensectl").join("config.json"));
    }
    if let Ok(home) = env::var("HOME") {
        paths.push(
            Path::new(&home)
                .join(".config")
                .join("sensectl")
                .join("config.json"),
        );
    }
    paths.push(system_config_path());
    paths
}

pub fn system_config_path() -> PathBuf { PathBuf::from("/etc/sensectl/config.json") }

/// Home of the user who ran sudo, falling back to $HOME.
fn invoking_user_home() -> Option<PathBuf> {
    if let Ok(user) = env::var("SUDO_USER") {
        if !user.is_empty() && user != "root" {
            return Some(Path::new("/home").join(user));
        }
    }
    env::var("HOME").ok().map(PathBuf::from)
}

fn expand_home(path: &str, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix("~/"), home) {
        (Some(rest), Some(home)) => home.join(rest),
        _ if path == "~" => home.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(path)),
        _ => PathBuf::from(path),
    }
}

fn is_safe_module_name(s: &str) -> bool {
    !s.is_empty() && s.len() <= 64 && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

pub fn validate_config(cfg: &SenseConfig) -> Result<()> {
    if !is_safe_module_name(&cfg.module_name) {
        return Err(SenseError::config(format!("invalid module name '{}'", cfg.module_name)));
    }
    if cfg.module_path.trim().is_empty() {
        return Err(SenseError::config("module_path must not be empty"));
    }
    if !cfg.sysfs_base.is_absolute() {
        return Err(SenseError::config(format!(
            "sysfs_base must be an absolute path ({})",
            cfg.sysfs_base.display()
        )));
    }
    Ok(())
}

pub fn load_config_from(path: &Path) -> Result<SenseConfig> {
    let data = fs::read_to_string(path)
        .map_err(|e| SenseError::config(format!("{}: {}", path.display(), e)))?;
    let cfg: SenseConfig = serde_json::from_str(&data)
        .map_err(|e| SenseError::config(format!("{}: parse error: {}", path.display(), e)))?;
    validate_config(&cfg)?;
    Ok(cfg)
}

/// First existing file from [`config_candidates`], else built-in defaults. A
/// file that exists but does not parse or validate is an error.
pub fn load_config() -> Result<SenseConfig> {
    for path in config_candidates() {
        if path.exists() {
            return load_config_from(&path);
        }
    }
    Ok(SenseConfig::default())
}
