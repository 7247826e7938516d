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

//! sensectl - console control for Acer Predator Sense attributes
//!
//! This library reads, formats and writes the hardware-control attributes the
//! linuwu_sense kernel module exposes under sysfs, and drives them from a
//! numeric menu.

pub mod error;
pub mod attributes;
pub mod codec;
pub mod store;
pub mod console;
pub mod executor;
pub mod menu;
pub mod module;
pub mod config;
pub mod system;
pub mod logger;

#[cfg(test)]
pub mod test_utils;
