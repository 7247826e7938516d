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
use std::process::{self, Command};

pub fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

/// Re-run this binary through sudo with the same arguments. Never returns.
pub fn restart_as_root(args: &[String]) -> ! {
    eprintln!("Error: sensectl must be run as root. Restarting with sudo...");
    let exe = env::current_exe()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "sensectl".to_string());
    match Command::new("sudo").arg(exe).args(args.iter().skip(1)).status() {
        Ok(status) => process::exit(status.code().unwrap_or(1)),
        Err(e) => {
            eprintln!("Failed to restart with sudo: {}", e);
            process::exit(1);
        }
    }
}

/// Machine name for the main menu header, e.g. "Acer Predator PHN16-71".
pub fn read_product_name() -> String {
    let read_trim = |p: &str| -> Option<String> {
        fs::read_to_string(p)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };
    let vendor = read_trim("/sys/devices/virtual/dmi/id/sys_vendor");
    let product = read_trim("/sys/devices/virtual/dmi/id/product_name");
    product_label(vendor, product)
}

fn product_label(vendor: Option<String>, product: Option<String>) -> String {
    match (vendor, product) {
        (Some(v), Some(p)) if p.starts_with(&v) => p,
        (Some(v), Some(p)) => format!("{} {}", v, p),
        (Some(v), None) => v,
        (None, Some(p)) => p,
        (None, None) => String::new(),
    }
}
