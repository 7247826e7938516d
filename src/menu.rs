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

//! Numeric menu state machine.
//!
//! Each call to [`MenuEngine::step`] renders one screen from a fresh read of
//! the bound attribute, takes one answer and returns the next state. Menu
//! definitions are rebuilt on every entry and never persisted.

use std::time::Duration;

use crate::attributes::Attribute;
use crate::codec::{self, BinaryFlag, FanPair, FanPreset, UsbThreshold, FAN_PERCENT_MAX};
use crate::console::{self, Console, Tone};
use crate::error::Result;
use crate::executor::{ActionExecutor, MenuOption, Outcome};
use crate::module::ModuleControl;
use crate::store::AttributeStore;

const RETURN_PAUSE: Duration = Duration::from_millis(500);
const MESSAGE_PAUSE: Duration = Duration::from_secs(1);
const ERROR_PAUSE: Duration = Duration::from_secs(2);

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    MainMenu,
    AttributeMenu(Attribute),
    FanMenu,
    ModuleMenu,
    Exit,
}

/// An attribute menu: title, bound attribute, formatter and options.
/// Index 0 ("Return to main menu") is implicit.
pub struct Menu {
    pub title: &'static str,
    pub attribute: Attribute,
    pub formatter: fn(&str) -> String,
    pub options: Vec<MenuOption>,
}

fn toggle(enable: &'static str, disable: &'static str) -> Vec<MenuOption> {
    vec![
        MenuOption::new(enable, BinaryFlag::Enabled.encode()),
        MenuOption::new(disable, BinaryFlag::Disabled.encode()),
    ]
}

/// Menu definition for a plain attribute. Fan speed has its own menu.
pub fn attribute_menu(attr: Attribute) -> Option<Menu> {
    let (title, formatter, options): (&'static str, fn(&str) -> String, Vec<MenuOption>) = match attr {
        Attribute::Backlight => (
            "Keyboard Backlight Timeout",
            codec::format_binary,
            toggle("Enable timeout (turns off when inactive)", "Disable timeout (always on)"),
        ),
        Attribute::BatteryLimiter => (
            "Battery Charge Limiter",
            codec::format_binary,
            toggle("Enable (80% limit)", "Disable (full charge)"),
        ),
        Attribute::BootAnimation => (
            "Boot Animation/Sound",
            codec::format_binary,
            toggle("Enable animation/sound", "Disable animation/sound"),
        ),
        Attribute::LcdOverride => (
            "LCD Override",
            codec::format_binary,
            toggle("Enable override", "Disable override"),
        ),
        Attribute::UsbCharging => {
            let labels = [
                "Disable charging",
                "Enable until 10% battery",
                "Enable until 20% battery",
                "Enable until 30% battery",
            ];
            let options = labels
                .into_iter()
                .zip(UsbThreshold::PRESETS)
                .map(|(label, pct)| MenuOption::new(label, UsbThreshold::from_percent(pct).encode()))
                .collect();
            ("USB Charging Control", codec::format_usb, options)
        }
        Attribute::BatteryCalibration => (
            "Battery Calibration",
            codec::format_binary,
            vec![
                MenuOption::confirmed("Start calibration (requires AC)", BinaryFlag::Enabled.encode()),
                MenuOption::new("Stop calibration", BinaryFlag::Disabled.encode()),
            ],
        ),
        Attribute::FanSpeed => return None,
    };
    Some(Menu { title, attribute: attr, formatter, options })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MainEntry {
    Attribute(Attribute),
    Fan,
    Module,
}

impl MainEntry {
    fn all() -> Vec<MainEntry> {
        Attribute::ALL
            .into_iter()
            .map(|attr| match attr {
                Attribute::FanSpeed => MainEntry::Fan,
                other => MainEntry::Attribute(other),
            })
            .chain(std::iter::once(MainEntry::Module))
            .collect()
    }

    fn attribute(self) -> Option<Attribute> {
        match self {
            MainEntry::Attribute(attr) => Some(attr),
            MainEntry::Fan => Some(Attribute::FanSpeed),
            MainEntry::Module => None,
        }
    }

    fn needs_module(self) -> bool {
        !matches!(self, MainEntry::Module)
    }
}

/// Current formatted state of every attribute; unreadable ones show "N/A".
pub fn state_summary<S: AttributeStore + ?Sized>(store: &S) -> Vec<(Attribute, String)> {
    Attribute::ALL
        .into_iter()
        .map(|attr| {
            let shown = store
                .read(attr)
                .map(|raw| attr.format(&raw))
                .unwrap_or_else(|_| NOT_AVAILABLE.to_string());
            (attr, shown)
        })
        .collect()
}

/// One line per attribute for `sensectl status`. Fan speed also shows each
/// channel when the raw value is a valid pair.
pub fn status_lines<S: AttributeStore + ?Sized>(store: &S) -> Vec<String> {
    state_summary(store)
        .into_iter()
        .map(|(attr, shown)| {
            let detail = match attr {
                Attribute::FanSpeed => store
                    .read(attr)
                    .ok()
                    .and_then(|raw| raw.parse::<FanPair>().ok())
                    .map(|pair| format!(" (CPU {}%, GPU {}%)", pair.cpu(), pair.gpu()))
                    .unwrap_or_default(),
                _ => String::new(),
            };
            format!("{:<25} {}{}", attr.label(), shown, detail)
        })
        .collect()
}

pub struct MenuEngine<S: AttributeStore, C: Console, M: ModuleControl> {
    store: S,
    console: C,
    module: M,
    product: String,
}

impl<S: AttributeStore, C: Console, M: ModuleControl> MenuEngine<S, C, M> {
    pub fn new(store: S, console: C, module: M) -> Self {
        Self { store, console, module, product: String::new() }
    }

    /// Machine name shown under the main menu title.
    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = product.into();
        self
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    /// Drive the menus from `MainMenu` until `Exit`. Only fatal errors end
    /// the loop early.
    pub fn run(&mut self) -> Result<()> {
        let mut state = MenuState::MainMenu;
        while state != MenuState::Exit {
            state = self.step(state)?;
        }
        Ok(())
    }

    pub fn step(&mut self, state: MenuState) -> Result<MenuState> {
        match state {
            MenuState::MainMenu => self.main_menu(),
            MenuState::AttributeMenu(attr) => self.attribute_menu(attr),
            MenuState::FanMenu => self.fan_menu(),
            MenuState::ModuleMenu => self.module_menu(),
            MenuState::Exit => Ok(MenuState::Exit),
        }
    }

    fn main_menu(&mut self) -> Result<MenuState> {
        self.console.clear();

        let loaded = self.module.is_loaded();
        if !loaded {
            let name = self.module.name();
            self.console.line(Tone::Error, &format!("WARNING: Module {} is not loaded!", name));
            self.console.line(Tone::Plain, "Please load the module first from the Module Management menu.");
            self.console.line(Tone::Plain, "");
        }

        self.console.line(Tone::Title, "===== Predator Sense Control =====");
        if !self.product.is_empty() {
            self.console.line(Tone::Plain, &self.product);
        }
        self.console.line(Tone::Plain, "");

        let summary = state_summary(&self.store);
        let entries = MainEntry::all();
        for (i, entry) in entries.iter().enumerate() {
            let (label, status) = match entry.attribute() {
                Some(attr) => {
                    let status = summary
                        .iter()
                        .find(|(a, _)| *a == attr)
                        .map(|(_, s)| s.clone())
                        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
                    (attr.label(), status)
                }
                None => ("Module Management", "---".to_string()),
            };
            let head = format!("{:2}. {:<25} [", i + 1, label);
            self.console
                .write(&[(Tone::Plain, head.as_str()), (Tone::State, status.as_str()), (Tone::Plain, "]")]);
        }
        self.console.line(Tone::Plain, "");
        self.console.line(Tone::Plain, " 0. Exit");
        self.console.line(Tone::Title, "===================================");

        let Some(choice) = console::read_number(&mut self.console, "Select feature: ", 0, entries.len() as u32)? else {
            return Ok(MenuState::Exit);
        };
        if choice == 0 {
            self.console.line(Tone::Success, "Exiting...");
            return Ok(MenuState::Exit);
        }

        let entry = entries[choice as usize - 1];
        if entry.needs_module() && !self.module.is_loaded() {
            self.console.line(Tone::Error, "Module not loaded! Please load the module first.");
            self.console.pause(ERROR_PAUSE);
            return Ok(MenuState::MainMenu);
        }

        Ok(match entry {
            MainEntry::Attribute(attr) => MenuState::AttributeMenu(attr),
            MainEntry::Fan => MenuState::FanMenu,
            MainEntry::Module => MenuState::ModuleMenu,
        })
    }

    /// Read and format the current state. `Ok(None)` means a non-fatal read
    /// error was shown and the caller should go back to the main menu.
    fn current_state(&mut self, attr: Attribute, formatter: fn(&str) -> String) -> Result<Option<String>> {
        match self.store.read(attr) {
            Ok(raw) => Ok(Some(formatter(&raw))),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                self.console.line(Tone::Error, &format!("Error reading current state: {}", e));
                console::wait_for_enter(&mut self.console)?;
                Ok(None)
            }
        }
    }

    fn render_header(&mut self, title: &str, current: &str) {
        self.console.line(Tone::Title, &format!("=== {} ===", title));
        self.console.write(&[(Tone::Plain, "Current state: "), (Tone::State, current)]);
        self.console.line(Tone::Plain, "");
    }

    fn render_footer(&mut self, title: &str) {
        self.console.line(Tone::Plain, "");
        self.console.line(Tone::Plain, "0. Return to main menu");
        self.console.line(Tone::Title, &"=".repeat(title.len() + 8));
    }

    fn return_to_main(&mut self) -> MenuState {
        self.console.line(Tone::Warning, "Returning to main menu...");
        self.console.pause(RETURN_PAUSE);
        MenuState::MainMenu
    }

    /// Show the result of one action. Fatal failures propagate; everything
    /// else is displayed and the menu continues.
    fn report(&mut self, outcome: Outcome, success: impl FnOnce(&str) -> String) -> Result<()> {
        match outcome {
            Outcome::Applied { state } => {
                self.console.line(Tone::Success, &success(&state));
                self.console.pause(MESSAGE_PAUSE);
            }
            Outcome::Cancelled => {
                self.console.line(Tone::Warning, "Cancelled!");
                self.console.pause(MESSAGE_PAUSE);
            }
            Outcome::Failed(e) if e.is_fatal() => return Err(e),
            Outcome::Failed(e) => {
                self.console.line(Tone::Error, &format!("Error: {}", e));
                self.console.pause(ERROR_PAUSE);
            }
        }
        Ok(())
    }

    fn attribute_menu(&mut self, attr: Attribute) -> Result<MenuState> {
        let Some(menu) = attribute_menu(attr) else {
            return Ok(MenuState::FanMenu);
        };

        self.console.clear();
        let Some(current) = self.current_state(menu.attribute, menu.formatter)? else {
            return Ok(MenuState::MainMenu);
        };

        self.render_header(menu.title, &current);
        for (i, option) in menu.options.iter().enumerate() {
            self.console.line(Tone::Plain, &format!("{}. {}", i + 1, option.label));
        }
        self.render_footer(menu.title);

        let Some(choice) = console::read_number(&mut self.console, "Choice: ", 0, menu.options.len() as u32)? else {
            return Ok(MenuState::Exit);
        };
        if choice == 0 {
            return Ok(self.return_to_main());
        }

        let option = &menu.options[choice as usize - 1];
        let outcome = ActionExecutor::new(&self.store, &mut self.console).execute(attr, option);
        self.report(outcome, |state| format!("✓ {} successful! Now: {}", option.label, state))?;
        Ok(MenuState::AttributeMenu(attr))
    }

    fn fan_menu(&mut self) -> Result<MenuState> {
        const TITLE: &str = "Fan Speed Control";
        const CUSTOM: u32 = FanPreset::ALL.len() as u32 + 1;

        self.console.clear();
        let Some(current) = self.current_state(Attribute::FanSpeed, codec::format_fan)? else {
            return Ok(MenuState::MainMenu);
        };

        self.render_header(TITLE, &current);
        for (i, preset) in FanPreset::ALL.iter().enumerate() {
            self.console.line(Tone::Plain, &format!("{}. {}", i + 1, preset.menu_label()));
        }
        self.console.line(Tone::Plain, &format!("{}. Custom speeds", CUSTOM));
        self.render_footer(TITLE);

        let Some(choice) = console::read_number(&mut self.console, "Choice: ", 0, CUSTOM)? else {
            return Ok(MenuState::Exit);
        };

        let (label, pair) = match choice {
            0 => return Ok(self.return_to_main()),
            c if c < CUSTOM => {
                let preset = FanPreset::ALL[c as usize - 1];
                (preset.menu_label(), preset.pair())
            }
            _ => match self.read_custom_pair()? {
                Some(pair) => ("Custom speeds", pair),
                None => return Ok(MenuState::Exit),
            },
        };

        let outcome = ActionExecutor::new(&self.store, &mut self.console)
            .apply(Attribute::FanSpeed, label, &pair.encode(), false);
        // per-channel wording unless the driver reports something else
        let written = codec::format_fan(&pair.encode());
        self.report(outcome, |state| {
            let shown = if state == written { pair.describe() } else { state.to_string() };
            format!("✓ Fan speed set to {}", shown)
        })?;
        Ok(MenuState::FanMenu)
    }

    /// Prompt for both channels until they form a valid pair. Out-of-range
    /// values are rejected here and never reach the store.
    fn read_custom_pair(&mut self) -> Result<Option<FanPair>> {
        let max = FAN_PERCENT_MAX as u32;
        loop {
            let Some(cpu) = console::read_number(&mut self.console, "Enter CPU fan % (0-100): ", 0, max)? else {
                return Ok(None);
            };
            let Some(gpu) = console::read_number(&mut self.console, "Enter GPU fan % (0-100): ", 0, max)? else {
                return Ok(None);
            };
            match FanPair::new(cpu, gpu) {
                Ok(pair) => return Ok(Some(pair)),
                Err(e) => self.console.line(Tone::Error, &e.to_string()),
            }
        }
    }

    fn module_menu(&mut self) -> Result<MenuState> {
        const TITLE: &str = "Module Management";

        self.console.clear();
        let name = self.module.name();
        let loaded = self.module.is_loaded();
        let (tone, status) = if loaded { (Tone::Success, "Loaded") } else { (Tone::Error, "Not Loaded") };

        self.console.line(Tone::Title, &format!("=== {} ===", TITLE));
        self.console.write(&[(Tone::Plain, "Module status: "), (tone, status)]);
        self.console.line(Tone::Plain, "");
        self.console.line(Tone::Plain, "1. Load module");
        self.console.line(Tone::Plain, "2. Unload module");
        self.console.line(Tone::Plain, "3. Reload module");
        self.render_footer(TITLE);

        let Some(choice) = console::read_number(&mut self.console, "Choice: ", 0, 3)? else {
            return Ok(MenuState::Exit);
        };

        let (result, done) = match choice {
            0 => return Ok(self.return_to_main()),
            1 if loaded => {
                self.console.line(Tone::Warning, &format!("Module {} is already loaded", name));
                self.console.pause(ERROR_PAUSE);
                return Ok(MenuState::ModuleMenu);
            }
            2 if !loaded => {
                self.console.line(Tone::Warning, &format!("Module {} is not loaded", name));
                self.console.pause(ERROR_PAUSE);
                return Ok(MenuState::ModuleMenu);
            }
            1 => {
                self.console.line(Tone::Warning, &format!("Loading {} module...", name));
                (self.module.load(), "loaded")
            }
            2 => {
                self.console.line(Tone::Warning, &format!("Unloading {} module...", name));
                (self.module.unload(), "unloaded")
            }
            _ => {
                self.console.line(Tone::Warning, &format!("Reloading {} module...", name));
                (self.module.reload(), "reloaded")
            }
        };

        match result {
            Ok(()) => {
                self.console.line(Tone::Success, &format!("Module {} {} successfully", name, done));
            }
            Err(e) => {
                self.console.line(Tone::Error, &format!("ERROR: {}", e));
                if choice != 2 {
                    self.console.line(Tone::Plain, "Check: 1) Module path 2) Kernel compatibility 3) Hardware support");
                }
            }
        }
        self.console.pause(ERROR_PAUSE);
        Ok(MenuState::ModuleMenu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SenseError;
    use crate::module::MockModuleControl;
    use crate::store::{MockAttributeStore, SysfsStore};
    use crate::test_utils::{FakeSysfs, ScriptedConsole};
    use std::path::PathBuf;

    fn module(loaded: bool) -> MockModuleControl {
        let mut m = MockModuleControl::new();
        m.expect_is_loaded().returning(move || loaded);
        m.expect_name().returning(|| "linuwu_sense".to_string());
        m
    }

    fn engine(sysfs: &FakeSysfs, answers: &[&str]) -> MenuEngine<SysfsStore, ScriptedConsole, MockModuleControl> {
        MenuEngine::new(sysfs.store(), ScriptedConsole::new(answers), module(true))
    }

    #[test]
    fn test_menu_definitions() {
        let calibration = attribute_menu(Attribute::BatteryCalibration).unwrap();
        assert_eq!(calibration.options.len(), 2);
        assert!(calibration.options[0].confirm);
        assert_eq!(calibration.options[0].value, "1");
        assert!(!calibration.options[1].confirm);

        let usb = attribute_menu(Attribute::UsbCharging).unwrap();
        let values: Vec<&str> = usb.options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["0", "10", "20", "30"]);
        assert_eq!((usb.formatter)("10"), "Until 10%");

        for attr in [Attribute::Backlight, Attribute::BatteryLimiter, Attribute::BootAnimation, Attribute::LcdOverride] {
            let menu = attribute_menu(attr).unwrap();
            assert_eq!(menu.attribute, attr);
            assert_eq!(menu.options.iter().map(|o| o.value.as_str()).collect::<Vec<_>>(), vec!["1", "0"]);
            assert!(menu.options.iter().all(|o| !o.confirm));
        }
        assert!(attribute_menu(Attribute::FanSpeed).is_none());
    }

    #[test]
    fn test_state_summary_marks_unreadable() {
        let sysfs = FakeSysfs::new();
        sysfs.set(Attribute::Backlight, "1");
        sysfs.set(Attribute::FanSpeed, "50,50");
        sysfs.remove(Attribute::UsbCharging);
        let summary = state_summary(&sysfs.store());
        assert_eq!(summary.len(), 7);
        assert_eq!(summary[0], (Attribute::Backlight, "Enabled".to_string()));
        assert_eq!(summary[3], (Attribute::FanSpeed, "Balanced".to_string()));
        assert_eq!(summary[5], (Attribute::UsbCharging, "N/A".to_string()));
    }

    #[test]
    fn test_status_lines_split_fan_channels() {
        let sysfs = FakeSysfs::new();
        sysfs.set(Attribute::FanSpeed, "40,65");
        sysfs.set(Attribute::UsbCharging, "10");
        let lines = status_lines(&sysfs.store());
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[3], format!("{:<25} Custom (40,65%) (CPU 40%, GPU 65%)", "Fan Speed Control"));
        assert_eq!(lines[5], format!("{:<25} Until 10%", "USB Charging"));
    }

    #[test]
    fn test_status_lines_without_valid_pair() {
        let sysfs = FakeSysfs::new();
        sysfs.set(Attribute::FanSpeed, "40,abc");
        sysfs.remove(Attribute::Backlight);
        let lines = status_lines(&sysfs.store());
        assert_eq!(lines[0], format!("{:<25} N/A", "Keyboard Backlight"));
        assert_eq!(lines[3], format!("{:<25} Custom (40,abc%)", "Fan Speed Control"));
    }

    #[test]
    fn test_main_menu_renders_states() {
        let sysfs = FakeSysfs::new();
        sysfs.set(Attribute::Backlight, "1");
        sysfs.set(Attribute::FanSpeed, "40,60");
        sysfs.set(Attribute::UsbCharging, "20");
        let mut engine = engine(&sysfs, &["0"]).with_product("Acer Predator PHN16-71");

        assert_eq!(engine.step(MenuState::MainMenu).unwrap(), MenuState::Exit);
        let console = engine.console();
        assert!(console.contains(" 1. Keyboard Backlight        [Enabled]"));
        assert!(console.contains(" 4. Fan Speed Control         [Custom (40,60%)]"));
        assert!(console.contains(" 6. USB Charging              [Until 20%]"));
        assert!(console.contains(" 8. Module Management         [---]"));
        assert!(console.contains("Acer Predator PHN16-71"));
        assert!(console.contains("Exiting..."));
    }

    #[test]
    fn test_main_menu_transitions() {
        let sysfs = FakeSysfs::new();
        let cases = [
            ("1", MenuState::AttributeMenu(Attribute::Backlight)),
            ("3", MenuState::AttributeMenu(Attribute::BootAnimation)),
            ("4", MenuState::FanMenu),
            ("6", MenuState::AttributeMenu(Attribute::UsbCharging)),
            ("7", MenuState::AttributeMenu(Attribute::BatteryCalibration)),
            ("8", MenuState::ModuleMenu),
            ("0", MenuState::Exit),
        ];
        for (answer, expected) in cases {
            let mut engine = engine(&sysfs, &[answer]);
            assert_eq!(engine.step(MenuState::MainMenu).unwrap(), expected, "answer {}", answer);
        }
    }

    #[test]
    fn test_non_numeric_input_reissues_same_prompt() {
        let sysfs = FakeSysfs::new();
        let mut engine = engine(&sysfs, &["abc", "4"]);

        assert_eq!(engine.step(MenuState::MainMenu).unwrap(), MenuState::FanMenu);
        let console = engine.console();
        assert_eq!(console.prompts, vec!["Select feature: ", "Select feature: "]);
        assert_eq!(console.count("Invalid input! Please enter a number."), 1);
        // one render, the bad answer did not redraw or move the menu
        assert_eq!(console.clears, 1);
    }

    #[test]
    fn test_input_closed_exits() {
        let sysfs = FakeSysfs::new();
        for state in [
            MenuState::MainMenu,
            MenuState::AttributeMenu(Attribute::LcdOverride),
            MenuState::FanMenu,
            MenuState::ModuleMenu,
        ] {
            let mut engine = engine(&sysfs, &[]);
            assert_eq!(engine.step(state).unwrap(), MenuState::Exit);
        }
    }

    #[test]
    fn test_module_not_loaded_blocks_hardware_entries() {
        let sysfs = FakeSysfs::new();
        let mut engine = MenuEngine::new(sysfs.store(), ScriptedConsole::new(&["2"]), module(false));
        assert_eq!(engine.step(MenuState::MainMenu).unwrap(), MenuState::MainMenu);
        assert!(engine.console().contains("WARNING: Module linuwu_sense is not loaded!"));
        assert!(engine.console().contains("Module not loaded! Please load the module first."));

        let mut engine = MenuEngine::new(sysfs.store(), ScriptedConsole::new(&["8"]), module(false));
        assert_eq!(engine.step(MenuState::MainMenu).unwrap(), MenuState::ModuleMenu);
    }

    #[test]
    fn test_attribute_option_writes_and_stays() {
        let sysfs = FakeSysfs::new();
        let mut engine = engine(&sysfs, &["3"]);

        let next = engine.step(MenuState::AttributeMenu(Attribute::UsbCharging)).unwrap();
        assert_eq!(next, MenuState::AttributeMenu(Attribute::UsbCharging));
        assert_eq!(sysfs.get(Attribute::UsbCharging), "20");
        let console = engine.console();
        assert!(console.contains("=== USB Charging Control ==="));
        assert!(console.contains("Current state: Disabled"));
        assert!(console.contains("4. Enable until 30% battery"));
        assert!(console.contains("✓ Enable until 20% battery successful! Now: Until 20%"));
    }

    #[test]
    fn test_attribute_menu_rerenders_fresh_state() {
        let sysfs = FakeSysfs::new();
        let mut engine = engine(&sysfs, &["1", "0"]);

        let state = engine.step(MenuState::AttributeMenu(Attribute::Backlight)).unwrap();
        // another process flips the value between renders
        sysfs.set(Attribute::Backlight, "0");
        assert_eq!(engine.step(state).unwrap(), MenuState::MainMenu);
        let console = engine.console();
        assert_eq!(console.count("Current state: Disabled"), 2);
        assert!(console.contains("Returning to main menu..."));
    }

    #[test]
    fn test_calibration_cancel_performs_no_write() {
        let mut store = MockAttributeStore::new();
        store
            .expect_read()
            .returning(|_| Ok("0".to_string()));
        store.expect_write().times(0);
        let mut engine = MenuEngine::new(store, ScriptedConsole::new(&["1", "n"]), module(true));

        let next = engine.step(MenuState::AttributeMenu(Attribute::BatteryCalibration)).unwrap();
        assert_eq!(next, MenuState::AttributeMenu(Attribute::BatteryCalibration));
        let console = engine.console();
        assert!(console.contains("Cancelled!"));
        assert_eq!(
            console.prompts,
            vec!["Choice: ", "Confirm Start calibration (requires AC)? (y/N): "]
        );
    }

    #[test]
    fn test_calibration_cancel_leaves_state_unchanged() {
        let sysfs = FakeSysfs::new();
        let mut engine = engine(&sysfs, &["1", "N", "0"]);
        let state = engine.step(MenuState::AttributeMenu(Attribute::BatteryCalibration)).unwrap();
        engine.step(state).unwrap();
        assert_eq!(sysfs.get(Attribute::BatteryCalibration), "0");
        assert_eq!(engine.console().count("Current state: Disabled"), 2);
    }

    #[test]
    fn test_calibration_confirmed_writes() {
        let sysfs = FakeSysfs::new();
        let mut engine = engine(&sysfs, &["1", "y"]);
        engine.step(MenuState::AttributeMenu(Attribute::BatteryCalibration)).unwrap();
        assert_eq!(sysfs.get(Attribute::BatteryCalibration), "1");
    }

    #[test]
    fn test_write_failure_is_inline() {
        let mut store = MockAttributeStore::new();
        store.expect_read().returning(|_| Ok("1".to_string()));
        store.expect_write().times(1).returning(|_, _| {
            Err(SenseError::WriteFailure {
                path: PathBuf::from("/sys/x/lcd_override"),
                reason: "Permission denied (os error 13)".into(),
            })
        });
        let mut engine = MenuEngine::new(store, ScriptedConsole::new(&["2"]), module(true));

        let next = engine.step(MenuState::AttributeMenu(Attribute::LcdOverride)).unwrap();
        assert_eq!(next, MenuState::AttributeMenu(Attribute::LcdOverride));
        assert!(engine.console().contains("Error: Failed to write to /sys/x/lcd_override"));
    }

    #[test]
    fn test_missing_path_is_fatal_before_write() {
        let sysfs = FakeSysfs::new();
        sysfs.remove(Attribute::LcdOverride);
        let mut engine = engine(&sysfs, &["1"]);

        let err = engine.step(MenuState::AttributeMenu(Attribute::LcdOverride)).unwrap_err();
        assert!(matches!(err, SenseError::PathMissing { attribute: "lcd_override", .. }));
        // the choice was never asked for
        assert!(engine.console().prompts.is_empty());
        assert!(!sysfs.path(Attribute::LcdOverride).exists());
    }

    #[test]
    fn test_read_failure_returns_to_main_menu() {
        let mut store = MockAttributeStore::new();
        store.expect_read().returning(|_| {
            Err(SenseError::ReadFailure {
                path: PathBuf::from("/sys/x/battery_limiter"),
                source: std::io::Error::new(std::io::ErrorKind::Other, "EIO"),
            })
        });
        store.expect_write().times(0);
        let mut engine = MenuEngine::new(store, ScriptedConsole::new(&[""]), module(true));

        let next = engine.step(MenuState::AttributeMenu(Attribute::BatteryLimiter)).unwrap();
        assert_eq!(next, MenuState::MainMenu);
        assert!(engine.console().contains("Error reading current state"));
        assert_eq!(engine.console().prompts, vec!["Press Enter to continue..."]);
    }

    #[test]
    fn test_fan_preset_applies() {
        let sysfs = FakeSysfs::new();
        sysfs.set(Attribute::FanSpeed, "100,100");
        let mut engine = engine(&sysfs, &["1"]);

        assert_eq!(engine.step(MenuState::FanMenu).unwrap(), MenuState::FanMenu);
        assert_eq!(sysfs.get(Attribute::FanSpeed), "0,0");
        let console = engine.console();
        assert!(console.contains("Current state: Turbo"));
        assert!(console.contains("6. Custom speeds"));
        assert!(console.contains("✓ Fan speed set to Auto"));
    }

    #[test]
    fn test_fan_custom_reprompts_on_bad_input() {
        let sysfs = FakeSysfs::new();
        let mut engine = engine(&sysfs, &["6", "101", "40", "abc", "65"]);

        assert_eq!(engine.step(MenuState::FanMenu).unwrap(), MenuState::FanMenu);
        assert_eq!(sysfs.get(Attribute::FanSpeed), "40,65");
        let console = engine.console();
        assert_eq!(
            console.prompts,
            vec![
                "Choice: ",
                "Enter CPU fan % (0-100): ",
                "Enter CPU fan % (0-100): ",
                "Enter GPU fan % (0-100): ",
                "Enter GPU fan % (0-100): ",
            ]
        );
        assert!(console.contains("✓ Fan speed set to Custom (40%, 65%)"));
    }

    #[test]
    fn test_fan_success_shows_reported_state_when_different() {
        let mut store = MockAttributeStore::new();
        store.expect_write().returning(|_, _| Ok(()));
        // driver clamps the write to a preset
        store.expect_read().returning(|_| Ok("30,30".to_string()));
        let mut engine = MenuEngine::new(store, ScriptedConsole::new(&["6", "35", "35"]), module(true));

        assert_eq!(engine.step(MenuState::FanMenu).unwrap(), MenuState::FanMenu);
        assert!(engine.console().contains("✓ Fan speed set to Quiet"));
    }

    #[test]
    fn test_fan_custom_out_of_range_never_writes() {
        let mut store = MockAttributeStore::new();
        store.expect_read().returning(|_| Ok("0,0".to_string()));
        store.expect_write().times(0);
        let mut engine = MenuEngine::new(store, ScriptedConsole::new(&["6", "50", "150", "255"]), module(true));

        // input runs out while still rejecting the GPU channel
        assert_eq!(engine.step(MenuState::FanMenu).unwrap(), MenuState::Exit);
        assert_eq!(engine.console().count("Please enter a number in range 0-100."), 2);
    }

    #[test]
    fn test_module_menu_load() {
        let sysfs = FakeSysfs::new();
        let mut m = MockModuleControl::new();
        m.expect_is_loaded().returning(|| false);
        m.expect_name().returning(|| "linuwu_sense".to_string());
        m.expect_load().times(1).returning(|| Ok(()));
        let mut engine = MenuEngine::new(sysfs.store(), ScriptedConsole::new(&["1"]), m);

        assert_eq!(engine.step(MenuState::ModuleMenu).unwrap(), MenuState::ModuleMenu);
        assert!(engine.console().contains("Module status: Not Loaded"));
        assert!(engine.console().contains("Module linuwu_sense loaded successfully"));
    }

    #[test]
    fn test_module_menu_failure_is_inline() {
        let sysfs = FakeSysfs::new();
        let mut m = MockModuleControl::new();
        m.expect_is_loaded().returning(|| true);
        m.expect_name().returning(|| "linuwu_sense".to_string());
        m.expect_reload().times(1).returning(|| {
            Err(SenseError::IncompatibleVersion { module: "linuwu_sense".into(), kernel: "6.9.3".into() })
        });
        let mut engine = MenuEngine::new(sysfs.store(), ScriptedConsole::new(&["3", "0"]), m);

        let state = engine.step(MenuState::ModuleMenu).unwrap();
        assert_eq!(state, MenuState::ModuleMenu);
        assert!(engine.console().contains("ERROR: Module linuwu_sense not compatible with kernel version (6.9.3)"));
        assert_eq!(engine.step(state).unwrap(), MenuState::MainMenu);
    }

    #[test]
    fn test_module_menu_skips_redundant_actions() {
        let sysfs = FakeSysfs::new();
        let mut m = MockModuleControl::new();
        m.expect_is_loaded().returning(|| true);
        m.expect_name().returning(|| "linuwu_sense".to_string());
        m.expect_load().times(0);
        let mut engine = MenuEngine::new(sysfs.store(), ScriptedConsole::new(&["1"]), m);

        assert_eq!(engine.step(MenuState::ModuleMenu).unwrap(), MenuState::ModuleMenu);
        assert!(engine.console().contains("Module linuwu_sense is already loaded"));
    }

    #[test]
    fn test_run_full_session() {
        let sysfs = FakeSysfs::new();
        let mut engine = engine(&sysfs, &["4", "2", "0", "7", "2", "0", "0"]);
        engine.run().unwrap();
        assert_eq!(sysfs.get(Attribute::FanSpeed), "30,30");
        assert_eq!(sysfs.get(Attribute::BatteryCalibration), "0");
        assert!(engine.console().contains("Exiting..."));
    }

    #[test]
    fn test_run_stops_on_fatal_error() {
        let sysfs = FakeSysfs::new();
        sysfs.remove(Attribute::FanSpeed);
        let mut engine = engine(&sysfs, &["4", "0"]);
        let err = engine.run().unwrap_err();
        assert!(err.is_fatal());
    }
}
