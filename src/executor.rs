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

//! Applies one selected action to an attribute.

use serde_json::json;

use crate::attributes::Attribute;
use crate::console::{self, Console};
use crate::error::SenseError;
use crate::logger;
use crate::store::AttributeStore;

/// One selectable entry of an attribute menu. The value is already encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption {
    pub label: &'static str,
    pub value: String,
    pub confirm: bool,
}

impl MenuOption {
    pub fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self { label, value: value.into(), confirm: false }
    }

    /// Same as `new`, but the write is gated behind a y/N prompt.
    pub fn confirmed(label: &'static str, value: impl Into<String>) -> Self {
        Self { label, value: value.into(), confirm: true }
    }
}

#[derive(Debug)]
pub enum Outcome {
    /// Written; carries the formatted state read back afterwards.
    Applied { state: String },
    /// Operator declined the confirmation prompt. Nothing was written.
    Cancelled,
    Failed(SenseError),
}

pub struct ActionExecutor<'a, S: AttributeStore + ?Sized, C: Console + ?Sized> {
    store: &'a S,
    console: &'a mut C,
}

impl<'a, S: AttributeStore + ?Sized, C: Console + ?Sized> ActionExecutor<'a, S, C> {
    pub fn new(store: &'a S, console: &'a mut C) -> Self {
        Self { store, console }
    }

    pub fn execute(&mut self, attr: Attribute, option: &MenuOption) -> Outcome {
        self.apply(attr, option.label, &option.value, option.confirm)
    }

    pub fn apply(&mut self, attr: Attribute, label: &str, value: &str, confirm: bool) -> Outcome {
        if confirm {
            match console::confirm(&mut *self.console, label) {
                Ok(true) => {}
                Ok(false) => {
                    logger::log_event(
                        "action_cancelled",
                        json!({ "attribute": attr.id(), "action": label }),
                    );
                    return Outcome::Cancelled;
                }
                Err(e) => return Outcome::Failed(e),
            }
        }

        match self.store.write(attr, value) {
            Ok(()) => Outcome::Applied { state: self.current_state(attr, value) },
            Err(e) => Outcome::Failed(e),
        }
    }

    // Prefer what the driver reports now; it may normalise the value.
    fn current_state(&self, attr: Attribute, written: &str) -> String {
        match self.store.read(attr) {
            Ok(raw) => attr.format(&raw),
            Err(_) => attr.format(written),
        }
    }
}
