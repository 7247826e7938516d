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

//! linuwu_sense kernel module lifecycle.
//!
//! The attribute files only exist while the module is loaded, so startup makes
//! sure it is, and the Module Management menu can load, unload or reload it.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::Duration;

use serde_json::json;

use crate::config::SenseConfig;
use crate::error::{Result, SenseError};
use crate::logger;

const PROC_MODULES: &str = "/proc/modules";
const PROC_OSRELEASE: &str = "/proc/sys/kernel/osrelease";

/// Time for the driver to register its sysfs files after insmod.
const SETTLE_DELAY: Duration = Duration::from_secs(1);

#[cfg_attr(test, mockall::automock)]
pub trait ModuleControl {
    fn name(&self) -> String;
    fn is_loaded(&self) -> bool;
    fn load(&self) -> Result<()>;
    fn unload(&self) -> Result<()>;

    fn reload(&self) -> Result<()> {
        self.unload()?;
        self.load()
    }
}

#[derive(Debug, Clone)]
pub struct KernelModule {
    name: String,
    path: PathBuf,
    proc_modules: PathBuf,
    osrelease: PathBuf,
}

impl KernelModule {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            proc_modules: PathBuf::from(PROC_MODULES),
            osrelease: PathBuf::from(PROC_OSRELEASE),
        }
    }

    pub fn from_config(cfg: &SenseConfig) -> Self {
        Self::new(cfg.module_name.clone(), cfg.module_file())
    }

    /// Point the module table and kernel release lookups somewhere else.
    pub fn with_proc_paths(mut self, proc_modules: impl Into<PathBuf>, osrelease: impl Into<PathBuf>) -> Self {
        self.proc_modules = proc_modules.into();
        self.osrelease = osrelease.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kernel_release(&self) -> Result<String> {
        let release = fs::read_to_string(&self.osrelease).map_err(|e| SenseError::Command {
            command: format!("read {}", self.osrelease.display()),
            reason: format!("Failed to get kernel version: {}", e),
        })?;
        Ok(release.trim().to_string())
    }

    /// The module file must exist and be built for the running kernel.
    pub fn validate(&self) -> Result<()> {
        if !self.path.exists() {
            return Err(SenseError::ModuleFileMissing(self.path.clone()));
        }
        let kernel = self.kernel_release()?;
        let path = self.path.to_string_lossy().into_owned();
        let info = run_command("modinfo", &[path.as_str()])?;
        match vermagic_release(&info) {
            Some(release) if release == kernel => Ok(()),
            _ => Err(SenseError::IncompatibleVersion { module: self.name.clone(), kernel }),
        }
    }
}

impl ModuleControl for KernelModule {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn is_loaded(&self) -> bool {
        fs::read_to_string(&self.proc_modules)
            .map(|table| module_listed(&table, &self.name))
            .unwrap_or(false)
    }

    fn load(&self) -> Result<()> {
        if self.is_loaded() {
            return Ok(());
        }
        self.validate()?;
        let path = self.path.to_string_lossy().into_owned();
        run_command("insmod", &[path.as_str()])?;
        thread::sleep(SETTLE_DELAY);

        let loaded = self.is_loaded();
        logger::log_event("module_load", json!({ "module": self.name, "path": path, "loaded": loaded }));
        if loaded {
            Ok(())
        } else {
            Err(SenseError::ModuleNotLoaded(self.name.clone()))
        }
    }

    fn unload(&self) -> Result<()> {
        if !self.is_loaded() {
            return Ok(());
        }
        run_command("rmmod", &[self.name.as_str()])?;

        let still_loaded = self.is_loaded();
        logger::log_event("module_unload", json!({ "module": self.name, "unloaded": !still_loaded }));
        if still_loaded {
            Err(SenseError::Command {
                command: format!("rmmod {}", self.name),
                reason: "Module failed to unload properly".into(),
            })
        } else {
            Ok(())
        }
    }
}

fn run_command(program: &str, args: &[&str]) -> Result<String> {
    let command = format!("{} {}", program, args.join(" "));
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| SenseError::Command { command: command.clone(), reason: e.to_string() })?;
    if !output.status.success() {
        return Err(SenseError::Command {
            command,
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Whether `name` appears in the first column of a /proc/modules table.
pub fn module_listed(table: &str, name: &str) -> bool {
    table
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .any(|m| m == name)
}

/// Kernel release from the `vermagic:` line of modinfo output.
pub fn vermagic_release(modinfo: &str) -> Option<&str> {
    modinfo
        .lines()
        .find_map(|line| line.trim_start().strip_prefix("vermagic:"))
        .and_then(|rest| rest.split_whitespace().next())
}
