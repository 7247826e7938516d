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

//! Test fixtures: a fake driver directory and a scripted console.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;

use crate::attributes::{Attribute, AttributeRegistry};
use crate::console::{Console, Tone};
use crate::store::SysfsStore;

/// A temporary predator_sense directory with every attribute file present.
pub struct FakeSysfs {
    dir: TempDir,
}

impl FakeSysfs {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let sysfs = Self { dir };
        for attr in Attribute::ALL {
            let initial = match attr {
                Attribute::FanSpeed => "0,0",
                _ => "0",
            };
            sysfs.set(attr, initial);
        }
        sysfs
    }

    pub fn path(&self, attr: Attribute) -> PathBuf {
        self.registry().path(attr)
    }

    pub fn registry(&self) -> AttributeRegistry {
        AttributeRegistry::new(self.dir.path())
    }

    pub fn store(&self) -> SysfsStore {
        SysfsStore::new(self.registry())
    }

    pub fn set(&self, attr: Attribute, value: &str) {
        fs::write(self.path(attr), value).expect("write fake attribute");
    }

    pub fn get(&self, attr: Attribute) -> String {
        fs::read_to_string(self.path(attr)).expect("read fake attribute")
    }

    pub fn remove(&self, attr: Attribute) {
        fs::remove_file(self.path(attr)).expect("remove fake attribute");
    }
}

/// Replays queued answers and records everything shown.
pub struct ScriptedConsole {
    answers: VecDeque<String>,
    pub prompts: Vec<String>,
    pub output: Vec<String>,
    pub clears: usize,
}

impl ScriptedConsole {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|s| s.to_string()).collect(),
            prompts: Vec::new(),
            output: Vec::new(),
            clears: 0,
        }
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.output.iter().any(|l| l.contains(needle))
    }

    pub fn count(&self, needle: &str) -> usize {
        self.output.iter().filter(|l| l.contains(needle)).count()
    }
}

impl Console for ScriptedConsole {
    fn clear(&mut self) {
        self.clears += 1;
    }

    fn write(&mut self, segments: &[(Tone, &str)]) {
        let line: String = segments.iter().map(|(_, s)| *s).collect();
        self.output.push(line);
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.answers.pop_front())
    }

    fn pause(&mut self, _duration: Duration) {}
}
