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

//! Blocking access to the driver's sysfs attribute files.
//!
//! The store keeps no state between calls. Every read and write revalidates the
//! backing path first, so a module unloaded underneath us surfaces as
//! `PathMissing` rather than as a generic I/O error.

use std::fs::{self, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use serde_json::json;

use crate::attributes::{Attribute, AttributeRegistry};
use crate::error::{Result, SenseError};
use crate::logger;

#[cfg_attr(test, mockall::automock)]
pub trait AttributeStore {
    /// Resolve the backing path, failing with `PathMissing` if it is absent.
    fn validate(&self, attr: Attribute) -> Result<PathBuf>;

    /// Read the trimmed raw value.
    fn read(&self, attr: Attribute) -> Result<String>;

    /// Single write attempt; no retries.
    fn write(&self, attr: Attribute, value: &str) -> Result<()>;
}

/// Validate every registered attribute. Used once at startup.
pub fn validate_all<S: AttributeStore + ?Sized>(store: &S) -> Result<()> {
    for attr in Attribute::ALL {
        store.validate(attr)?;
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct SysfsStore {
    registry: AttributeRegistry,
}

impl SysfsStore {
    pub fn new(registry: AttributeRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &AttributeRegistry {
        &self.registry
    }
}

impl AttributeStore for SysfsStore {
    fn validate(&self, attr: Attribute) -> Result<PathBuf> {
        let path = self.registry.path(attr);
        if path.exists() {
            Ok(path)
        } else {
            Err(SenseError::PathMissing { attribute: attr.id(), path })
        }
    }

    fn read(&self, attr: Attribute) -> Result<String> {
        let path = self.validate(attr)?;
        read_trimmed(&path).map_err(|source| SenseError::ReadFailure { path, source })
    }

    fn write(&self, attr: Attribute, value: &str) -> Result<()> {
        let path = self.validate(attr)?;
        let res = write_value(&path, value);
        logger::log_event(
            "attribute_write",
            json!({
                "attribute": attr.id(),
                "value": value,
                "ok": res.is_ok(),
                "error": res.as_ref().err().map(|e| e.to_string()),
            }),
        );
        res.map_err(|e| SenseError::WriteFailure { path, reason: e.to_string() })
    }
}

fn read_trimmed(p: &Path) -> io::Result<String> {
    let mut s = String::new();
    fs::File::open(p)?.read_to_string(&mut s)?;
    Ok(s.trim().to_string())
}

// Never create: the driver owns these files.
fn write_value(p: &Path, value: &str) -> io::Result<()> {
    let mut f = OpenOptions::new().write(true).truncate(true).open(p)?;
    f.write_all(value.as_bytes())?;
    f.flush()
}
