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

//! Static catalog of the Predator Sense attributes exposed by the driver.
//!
//! Each attribute maps to one file under the driver's sysfs directory and to the
//! codec used to interpret its contents. The table is fixed at compile time;
//! only the base directory is chosen at runtime.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::codec::CodecKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Backlight,
    BatteryLimiter,
    BootAnimation,
    FanSpeed,
    LcdOverride,
    UsbCharging,
    BatteryCalibration,
}

#[derive(Debug)]
pub struct AttributeDescriptor {
    pub attribute: Attribute,
    pub id: &'static str,
    /// File name under the sysfs base directory
    pub file: &'static str,
    pub codec: CodecKind,
    /// Name shown in the main menu
    pub label: &'static str,
}

/// Indexed by `Attribute as usize`; keep the order in sync with the enum.
pub static REGISTRY: [AttributeDescriptor; 7] = [
    AttributeDescriptor {
        attribute: Attribute::Backlight,
        id: "backlight",
        file: "backlight_timeout",
        codec: CodecKind::Binary,
        label: "Keyboard Backlight",
    },
    AttributeDescriptor {
        attribute: Attribute::BatteryLimiter,
        id: "battery_limiter",
        file: "battery_limiter",
        codec: CodecKind::Binary,
        label: "Battery Limiter",
    },
    AttributeDescriptor {
        attribute: Attribute::BootAnimation,
        id: "boot_animation",
        file: "boot_animation_sound",
        codec: CodecKind::Binary,
        label: "Boot Animation/Sound",
    },
    AttributeDescriptor {
        attribute: Attribute::FanSpeed,
        id: "fan_speed",
        file: "fan_speed",
        codec: CodecKind::DualChannelPair,
        label: "Fan Speed Control",
    },
    AttributeDescriptor {
        attribute: Attribute::LcdOverride,
        id: "lcd_override",
        file: "lcd_override",
        codec: CodecKind::Binary,
        label: "LCD Override",
    },
    AttributeDescriptor {
        attribute: Attribute::UsbCharging,
        id: "usb_charging",
        file: "usb_charging",
        codec: CodecKind::PercentageThreshold,
        label: "USB Charging",
    },
    AttributeDescriptor {
        attribute: Attribute::BatteryCalibration,
        id: "battery_calibration",
        file: "battery_calibration",
        codec: CodecKind::Binary,
        label: "Battery Calibration",
    },
];

impl Attribute {
    /// All attributes in main menu order.
    pub const ALL: [Attribute; 7] = [
        Attribute::Backlight,
        Attribute::BatteryLimiter,
        Attribute::BootAnimation,
        Attribute::FanSpeed,
        Attribute::LcdOverride,
        Attribute::UsbCharging,
        Attribute::BatteryCalibration,
    ];

    pub fn descriptor(self) -> &'static AttributeDescriptor {
        &REGISTRY[self as usize]
    }

    pub fn id(self) -> &'static str {
        self.descriptor().id
    }

    pub fn file(self) -> &'static str {
        self.descriptor().file
    }

    pub fn codec(self) -> CodecKind {
        self.descriptor().codec
    }

    pub fn label(self) -> &'static str {
        self.descriptor().label
    }

    /// Render a raw value read from this attribute for display.
    pub fn format(self, raw: &str) -> String {
        self.codec().format(raw)
    }

    pub fn from_id(id: &str) -> Option<Attribute> {
        REGISTRY.iter().find(|d| d.id == id).map(|d| d.attribute)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Resolves attributes to concrete paths under one driver directory.
#[derive(Debug, Clone)]
pub struct AttributeRegistry {
    base: PathBuf,
}

impl AttributeRegistry {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn path(&self, attr: Attribute) -> PathBuf {
        self.base.join(attr.file())
    }
}
