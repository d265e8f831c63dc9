//! Duel log with verbosity levels, turn stamps and in-memory capture
//!
//! Logging takes `&self` so code holding a shared borrow of the duel can
//! still write to it; the capture buffer uses interior mutability.

use bumpalo::Bump;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, Ref, RefCell};
use std::fmt::Write as FmtWrite;
use std::ops::Deref;

/// Verbosity level for duel output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerbosityLevel {
    /// Nothing is printed
    Silent = 0,
    /// Outcomes and engine faults only
    Minimal = 1,
    /// Activations, summons and other key actions
    #[default]
    Normal = 2,
    /// Every zone move and selection
    Verbose = 3,
}

/// How printed entries look
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Where entries go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogSink {
    #[default]
    Stdout,
    /// Capture buffer only
    Memory,
    Both,
}

/// One captured line of the duel log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub turn: u32,
    pub level: VerbosityLevel,
    /// e.g. "zone_move", "selection", "engine_fault"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub message: String,
}

/// Read-only view of the capture buffer
pub struct LogGuard<'a> {
    guard: Ref<'a, Vec<LogEntry>>,
}

impl<'a> Deref for LogGuard<'a> {
    type Target = [LogEntry];

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

pub struct GameLogger {
    verbosity: VerbosityLevel,
    format: OutputFormat,
    sink: LogSink,
    turn: Cell<u32>,

    /// Scratch arena for fault formatting, reset after each use
    scratch: RefCell<Bump>,

    captured: RefCell<Vec<LogEntry>>,
}

impl GameLogger {
    pub fn new() -> Self {
        Self::with_verbosity(VerbosityLevel::default())
    }

    pub fn with_verbosity(verbosity: VerbosityLevel) -> Self {
        GameLogger {
            verbosity,
            format: OutputFormat::default(),
            sink: LogSink::default(),
            turn: Cell::new(1),
            scratch: RefCell::new(Bump::new()),
            captured: RefCell::new(Vec::new()),
        }
    }

    pub fn set_format(&mut self, format: OutputFormat) {
        self.format = format;
    }

    pub fn set_sink(&mut self, sink: LogSink) {
        self.sink = sink;
    }

    /// Capture to memory only (suppresses stdout)
    pub fn enable_capture(&mut self) {
        self.sink = LogSink::Memory;
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.sink, LogSink::Memory | LogSink::Both)
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: VerbosityLevel) {
        self.verbosity = verbosity;
    }

    /// Stamp later entries with `turn`
    pub fn set_turn(&self, turn: u32) {
        self.turn.set(turn);
    }

    pub fn logs(&self) -> LogGuard<'_> {
        LogGuard {
            guard: self.captured.borrow(),
        }
    }

    pub fn logs_in(&self, category: &str) -> Vec<LogEntry> {
        self.captured
            .borrow()
            .iter()
            .filter(|e| e.category.as_deref() == Some(category))
            .cloned()
            .collect()
    }

    /// Captured messages of one turn, in order
    pub fn messages_of_turn(&self, turn: u32) -> Vec<String> {
        self.captured
            .borrow()
            .iter()
            .filter(|e| e.turn == turn)
            .map(|e| e.message.clone())
            .collect()
    }

    pub fn clear_logs(&mut self) {
        self.captured.borrow_mut().clear();
        self.scratch.borrow_mut().reset();
    }

    fn print(&self, entry: &LogEntry) {
        match self.format {
            OutputFormat::Text => match entry.level {
                VerbosityLevel::Minimal => println!("{}", entry.message),
                _ => println!("  {}", entry.message),
            },
            OutputFormat::Json => {
                if let Ok(line) = serde_json::to_string(entry) {
                    println!("{line}");
                }
            }
        }
    }

    fn log_at(&self, level: VerbosityLevel, message: &str, category: Option<&str>) {
        let capture = self.is_capturing();
        let print = matches!(self.sink, LogSink::Stdout | LogSink::Both) && level <= self.verbosity;
        if !capture && !print {
            return;
        }

        let entry = LogEntry {
            turn: self.turn.get(),
            level,
            category: category.map(str::to_string),
            message: message.to_string(),
        };
        if print {
            self.print(&entry);
        }
        if capture {
            self.captured.borrow_mut().push(entry);
        }
    }

    #[inline]
    pub fn minimal(&self, message: &str) {
        self.log_at(VerbosityLevel::Minimal, message, None);
    }

    #[inline]
    pub fn normal(&self, message: &str) {
        self.log_at(VerbosityLevel::Normal, message, None);
    }

    #[inline]
    pub fn verbose(&self, message: &str) {
        self.log_at(VerbosityLevel::Verbose, message, None);
    }

    /// Categorized verbose entry
    #[inline]
    pub fn event(&self, category: &str, message: &str) {
        self.log_at(VerbosityLevel::Verbose, message, Some(category));
    }

    /// Engine invariant failure: always captured at Minimal and echoed to stderr
    pub fn fault(&self, context: &str, message: &str) {
        let formatted = {
            let bump = self.scratch.borrow();
            let mut s = bumpalo::collections::String::new_in(&bump);
            let _ = write!(s, "ENGINE FAULT [{context}]: {message}");
            s.as_str().to_string()
        };
        self.scratch.borrow_mut().reset();

        eprintln!("{formatted}");
        self.log_at(VerbosityLevel::Minimal, &formatted, Some("engine_fault"));
    }
}

impl Default for GameLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GameLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameLogger")
            .field("verbosity", &self.verbosity)
            .field("sink", &self.sink)
            .field("turn", &self.turn.get())
            .field("captured", &self.captured.borrow().len())
            .finish()
    }
}

impl Clone for GameLogger {
    /// Settings only; the clone starts with an empty buffer
    fn clone(&self) -> Self {
        GameLogger {
            verbosity: self.verbosity,
            format: self.format,
            sink: self.sink,
            turn: self.turn.clone(),
            scratch: RefCell::new(Bump::new()),
            captured: RefCell::new(Vec::new()),
        }
    }
}
