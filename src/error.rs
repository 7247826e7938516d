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

//! Error taxonomy for attribute control and bootstrap.
//!
//! Errors fall into two severities. Fatal errors (a missing backing interface,
//! bootstrap and configuration failures) end the session with a non-zero exit
//! code. Everything else is reported inline and the menu loop carries on.

use std::io;
use std::path::PathBuf;

/// Result type alias using SenseError
pub type Result<T> = std::result::Result<T, SenseError>;

#[derive(thiserror::Error, Debug)]
pub enum SenseError {
    // ============================================================================
    // Attribute Access Errors
    // ============================================================================
    #[error("SysFS interface missing for {attribute}! ({path})")]
    PathMissing {
        attribute: &'static str,
        path: PathBuf,
    },

    #[error("Failed to read from {path}: {source}")]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write to {path}: {reason}")]
    WriteFailure {
        path: PathBuf,
        reason: String,
    },

    // ============================================================================
    // Operator Input Errors
    // ============================================================================
    #[error("Invalid input! {0}")]
    InvalidInput(String),

    // ============================================================================
    // Bootstrap Errors
    // ============================================================================
    #[error("Kernel module {0} is not loaded")]
    ModuleNotLoaded(String),

    #[error("Kernel module not found at {0}")]
    ModuleFileMissing(PathBuf),

    #[error("Module {module} not compatible with kernel version ({kernel})")]
    IncompatibleVersion {
        module: String,
        kernel: String,
    },

    #[error("Command failed: {command}: {reason}")]
    Command {
        command: String,
        reason: String,
    },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl SenseError {
    /// Create an invalid input error from a string
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a config error from a string
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error must end the session instead of being shown inline.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::PathMissing { .. }
            | Self::ModuleNotLoaded(_)
            | Self::ModuleFileMissing(_)
            | Self::IncompatibleVersion { .. }
            | Self::Config(_)
            | Self::JsonParse(_) => true,
            Self::ReadFailure { .. }
            | Self::WriteFailure { .. }
            | Self::InvalidInput(_)
            | Self::Command { .. }
            | Self::Io(_) => false,
        }
    }
}
