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

use anyhow::Context;
use serde_json::json;

use sensectl::attributes::AttributeRegistry;
use sensectl::config::{self, SenseConfig};
use sensectl::console::TerminalConsole;
use sensectl::logger;
use sensectl::menu::{status_lines, MenuEngine};
use sensectl::module::{KernelModule, ModuleControl};
use sensectl::store::{self, AttributeStore, SysfsStore};
use sensectl::system;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    // Optional logging to /etc/sensectl/logs.json
    let logging_enabled = args.iter().any(|a| a == "--logging");
    if logging_enabled {
        logger::init_logging();
        logger::log_event("startup", json!({ "args": args }));
    }

    if !system::is_root() {
        system::restart_as_root(&args);
    }

    if let Err(err) = run(&args) {
        eprintln!("error: {:#}", err);
        logger::log_event("fatal_error", json!({ "error": format!("{:#}", err) }));
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> anyhow::Result<()> {
    let cfg: SenseConfig = config::load_config().context("loading configuration")?;
    let store = SysfsStore::new(AttributeRegistry::new(&cfg.sysfs_base));

    // `sensectl status` prints the current state and exits without touching the module
    if args.iter().skip(1).any(|a| a == "status") {
        print_status(&store);
        return Ok(());
    }

    let module = KernelModule::from_config(&cfg);
    if !module.is_loaded() {
        println!("Loading {} module...", cfg.module_name);
    }
    module
        .load()
        .with_context(|| format!("loading kernel module from {}", module.path().display()))?;
    store::validate_all(&store)?;

    let mut engine = MenuEngine::new(store, TerminalConsole::new(), module)
        .with_product(system::read_product_name());
    engine.run()?;
    Ok(())
}

fn print_status<S: AttributeStore>(store: &S) {
    println!("=== Predator Sense Status ===");
    for line in status_lines(store) {
        println!("{}", line);
    }
}
