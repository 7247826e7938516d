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

//! Line-oriented operator console.
//!
//! Menus describe what to show as toned text segments; the console decides how
//! to render them. `TerminalConsole` colours them with crossterm, tests replay
//! scripted answers instead.

use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::{PrintStyledContent, Stylize};
use crossterm::terminal::{Clear, ClearType};

use crate::error::{Result, SenseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Title,
    State,
    Success,
    Warning,
    Error,
}

pub trait Console {
    fn clear(&mut self);

    /// Print one line made of toned segments.
    fn write(&mut self, segments: &[(Tone, &str)]);

    /// Show `prompt` and read one line. `None` once input is exhausted.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    fn pause(&mut self, duration: Duration);

    fn line(&mut self, tone: Tone, text: &str) {
        self.write(&[(tone, text)]);
    }
}

pub struct TerminalConsole {
    stdin: io::Stdin,
    stdout: io::Stdout,
}

impl TerminalConsole {
    pub fn new() -> Self {
        Self { stdin: io::stdin(), stdout: io::stdout() }
    }
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for TerminalConsole {
    fn clear(&mut self) {
        let _ = execute!(self.stdout, Clear(ClearType::All), MoveTo(0, 0));
    }

    fn write(&mut self, segments: &[(Tone, &str)]) {
        let mut out = self.stdout.lock();
        for (tone, text) in segments {
            let styled = match tone {
                Tone::Plain => text.reset(),
                Tone::Title => text.green().bold(),
                Tone::State => text.cyan(),
                Tone::Success => text.green(),
                Tone::Warning => text.yellow(),
                Tone::Error => text.red(),
            };
            let _ = execute!(out, PrintStyledContent(styled));
        }
        let _ = writeln!(out);
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        {
            let mut out = self.stdout.lock();
            write!(out, "{}", prompt)?;
            out.flush()?;
        }
        let mut buf = String::new();
        let n = self.stdin.lock().read_line(&mut buf)?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(buf.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn pause(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Parse one menu answer, accepting only integers within `min..=max`.
pub fn parse_choice(input: &str, min: u32, max: u32) -> Result<u32> {
    let value = input
        .trim()
        .parse::<u32>()
        .map_err(|_| SenseError::invalid_input("Please enter a number."))?;
    if value < min || value > max {
        return Err(SenseError::invalid_input(format!(
            "Please enter a number in range {}-{}.",
            min, max
        )));
    }
    Ok(value)
}

/// Prompt until a valid number arrives. There is no retry limit.
/// Returns `None` when input is closed.
pub fn read_number<C: Console + ?Sized>(
    console: &mut C,
    prompt: &str,
    min: u32,
    max: u32,
) -> Result<Option<u32>> {
    loop {
        let Some(input) = console.read_line(prompt)? else {
            return Ok(None);
        };
        match parse_choice(&input, min, max) {
            Ok(v) => return Ok(Some(v)),
            Err(e) => console.line(Tone::Error, &e.to_string()),
        }
    }
}

/// Ask `Confirm {action}? (y/N): `. Anything but y/yes declines.
pub fn confirm<C: Console + ?Sized>(console: &mut C, action: &str) -> Result<bool> {
    let answer = console.read_line(&format!("Confirm {}? (y/N): ", action))?;
    Ok(matches!(
        answer.map(|a| a.trim().to_ascii_lowercase()).as_deref(),
        Some("y") | Some("yes")
    ))
}

pub fn wait_for_enter<C: Console + ?Sized>(console: &mut C) -> Result<()> {
    console.read_line("Press Enter to continue...")?;
    Ok(())
}
