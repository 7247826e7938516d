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

//! Value codecs for the three attribute wire formats.
//!
//! Decoding never fails: a value that does not match the expected shape is
//! shown verbatim so the operator still sees what the driver reports.
//! Encoding is strict and only produces values the driver accepts.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SenseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecKind {
    Binary,
    PercentageThreshold,
    DualChannelPair,
}

impl CodecKind {
    pub fn format(self, raw: &str) -> String {
        match self {
            CodecKind::Binary => format_binary(raw),
            CodecKind::PercentageThreshold => format_usb(raw),
            CodecKind::DualChannelPair => format_fan(raw),
        }
    }
}

pub fn format_binary(raw: &str) -> String {
    BinaryFlag::decode(raw)
        .map(|flag| flag.to_string())
        .unwrap_or_else(|| raw.to_string())
}

pub fn format_usb(raw: &str) -> String {
    UsbThreshold::decode(raw)
        .map(|threshold| threshold.to_string())
        .unwrap_or_else(|| raw.to_string())
}

pub fn format_fan(raw: &str) -> String {
    match FanPreset::from_raw(raw) {
        Some(preset) => preset.name().to_string(),
        None => format!("Custom ({}%)", raw),
    }
}

// ----------------------------------------------------------------------------
// Binary flag
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryFlag {
    Enabled,
    Disabled,
}

impl BinaryFlag {
    pub fn decode(raw: &str) -> Option<Self> {
        match raw {
            "1" => Some(BinaryFlag::Enabled),
            "0" => Some(BinaryFlag::Disabled),
            _ => None,
        }
    }

    pub fn encode(self) -> &'static str {
        match self {
            BinaryFlag::Enabled => "1",
            BinaryFlag::Disabled => "0",
        }
    }
}

impl fmt::Display for BinaryFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryFlag::Enabled => f.write_str("Enabled"),
            BinaryFlag::Disabled => f.write_str("Disabled"),
        }
    }
}

// ----------------------------------------------------------------------------
// Percentage threshold (USB charging)
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsbThreshold {
    Disabled,
    Until(u32),
}

impl UsbThreshold {
    /// Thresholds the driver accepts, in menu order.
    pub const PRESETS: [u32; 4] = [0, 10, 20, 30];

    pub fn decode(raw: &str) -> Option<Self> {
        raw.parse::<u32>().ok().map(Self::from_percent)
    }

    pub fn from_percent(percent: u32) -> Self {
        if percent == 0 {
            UsbThreshold::Disabled
        } else {
            UsbThreshold::Until(percent)
        }
    }

    pub fn encode(self) -> String {
        match self {
            UsbThreshold::Disabled => "0".to_string(),
            UsbThreshold::Until(n) => n.to_string(),
        }
    }
}

impl fmt::Display for UsbThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsbThreshold::Disabled => f.write_str("Disabled"),
            UsbThreshold::Until(n) => write!(f, "Until {}%", n),
        }
    }
}

// ----------------------------------------------------------------------------
// Dual-channel fan pair
// ----------------------------------------------------------------------------

pub const FAN_PERCENT_MAX: u8 = 100;

/// CPU and GPU fan duty in percent. Both channels are always within 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanPair {
    cpu: u8,
    gpu: u8,
}

impl FanPair {
    pub fn new(cpu: u32, gpu: u32) -> Result<Self> {
        let check = |channel: &str, v: u32| -> Result<u8> {
            if v > FAN_PERCENT_MAX as u32 {
                Err(SenseError::invalid_input(format!(
                    "{} fan speed {}% is out of range (0-{}).",
                    channel, v, FAN_PERCENT_MAX
                )))
            } else {
                Ok(v as u8)
            }
        };
        Ok(Self { cpu: check("CPU", cpu)?, gpu: check("GPU", gpu)? })
    }

    pub fn cpu(&self) -> u8 {
        self.cpu
    }

    pub fn gpu(&self) -> u8 {
        self.gpu
    }

    /// Wire form `cpu,gpu` without whitespace.
    pub fn encode(&self) -> String {
        format!("{},{}", self.cpu, self.gpu)
    }

    pub fn preset(&self) -> Option<FanPreset> {
        FanPreset::ALL.into_iter().find(|p| p.pair() == *self)
    }

    /// Preset name, or both channels spelled out: `Custom (40%, 65%)`.
    pub fn describe(&self) -> String {
        match self.preset() {
            Some(preset) => preset.name().to_string(),
            None => format!("Custom ({}%, {}%)", self.cpu, self.gpu),
        }
    }
}

impl FromStr for FanPair {
    type Err = SenseError;

    fn from_str(s: &str) -> Result<Self> {
        let (a, b) = s
            .split_once(',')
            .ok_or_else(|| SenseError::invalid_input(format!("'{}' is not a cpu,gpu pair.", s)))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| SenseError::invalid_input(format!("'{}' is not a cpu,gpu pair.", s)))
        };
        FanPair::new(parse(a)?, parse(b)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanPreset {
    Auto,
    Quiet,
    Balanced,
    Performance,
    Turbo,
}

impl FanPreset {
    pub const ALL: [FanPreset; 5] = [
        FanPreset::Auto,
        FanPreset::Quiet,
        FanPreset::Balanced,
        FanPreset::Performance,
        FanPreset::Turbo,
    ];

    fn percent(self) -> u8 {
        match self {
            FanPreset::Auto => 0,
            FanPreset::Quiet => 30,
            FanPreset::Balanced => 50,
            FanPreset::Performance => 70,
            FanPreset::Turbo => 100,
        }
    }

    pub fn pair(self) -> FanPair {
        let p = self.percent();
        FanPair { cpu: p, gpu: p }
    }

    pub fn encoded(self) -> String {
        self.pair().encode()
    }

    pub fn name(self) -> &'static str {
        match self {
            FanPreset::Auto => "Auto",
            FanPreset::Quiet => "Quiet",
            FanPreset::Balanced => "Balanced",
            FanPreset::Performance => "Performance",
            FanPreset::Turbo => "Turbo",
        }
    }

    pub fn menu_label(self) -> &'static str {
        match self {
            FanPreset::Auto => "Auto (system controlled)",
            FanPreset::Quiet => "Quiet (30% speed)",
            FanPreset::Balanced => "Balanced (50% speed)",
            FanPreset::Performance => "Performance (70% speed)",
            FanPreset::Turbo => "Turbo (100% speed)",
        }
    }

    /// Exact match against the preset wire strings; "50, 50" is not Balanced.
    pub fn from_raw(raw: &str) -> Option<FanPreset> {
        FanPreset::ALL.into_iter().find(|p| p.encoded() == raw)
    }
}
