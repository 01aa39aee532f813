//! Ordered line transformers applied after filtering.

use std::fmt;
use std::sync::Arc;

use regex::{Captures, Regex};

use crate::error::{Error, Result};

/// A line transformer.
///
/// Returning `None` drops the line: later plugins are not run and the line is
/// never delivered.
pub trait Plugin: Send + Sync {
    fn apply(&self, line: String) -> Option<String>;
}

impl<F> Plugin for F
where
    F: Fn(String) -> Option<String> + Send + Sync,
{
    fn apply(&self, line: String) -> Option<String> {
        self(line)
    }
}

/// Plugins in registration order.
#[derive(Clone, Default)]
pub struct PluginChain {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl PluginChain {
    pub fn new() -> Self {
        PluginChain::default()
    }

    pub fn push(&mut self, plugin: impl Plugin + 'static) {
        self.plugins.push(Arc::new(plugin));
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Runs the chain, stopping at the first plugin that drops the line.
    pub fn apply(&self, line: String) -> Option<String> {
        self.plugins
            .iter()
            .try_fold(line, |line, plugin| plugin.apply(line))
    }
}

impl fmt::Debug for PluginChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginChain")
            .field("len", &self.plugins.len())
            .finish()
    }
}

const RESET: &str = "\x1b[0m";

/// ANSI escape sequences used for each log level.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Theme {
    pub trace: &'static str,
    pub debug: &'static str,
    pub info: &'static str,
    pub warn: &'static str,
    pub error: &'static str,
}

impl Theme {
    /// Basic 8-colour palette.
    pub const DEFAULT: Theme = Theme {
        trace: "\x1b[37m",
        debug: "\x1b[36m",
        info: "\x1b[34m",
        warn: "\x1b[33m",
        error: "\x1b[31m",
    };

    /// 256-colour palette after the molokai vim scheme.
    pub const MOLOKAI: Theme = Theme {
        trace: "\x1b[38;5;244m",
        debug: "\x1b[38;5;81m",
        info: "\x1b[38;5;148m",
        warn: "\x1b[38;5;208m",
        error: "\x1b[38;5;197m",
    };

    /// Looks up a theme by name.
    pub fn named(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "" | "default" => Ok(Theme::DEFAULT),
            "molokai" => Ok(Theme::MOLOKAI),
            other => Err(Error::Config(format!("unknown color theme {:?}", other))),
        }
    }

    fn color(&self, level: &str) -> &'static str {
        match level {
            "TRACE" => self.trace,
            "DEBUG" => self.debug,
            "INFO" => self.info,
            "WARN" => self.warn,
            _ => self.error,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::DEFAULT
    }
}

/// Wraps log-level words in colour escapes. Never drops a line.
#[derive(Clone, Debug)]
pub struct Coloring {
    theme: Theme,
    levels: Regex,
}

impl Coloring {
    pub fn new(theme: Theme) -> Self {
        Coloring {
            theme,
            levels: Regex::new(r"\b(?:TRACE|DEBUG|INFO|WARN|ERROR)\b")
                .expect("level pattern is a valid regex"),
        }
    }

    /// Builds a coloring plugin from a theme name, see [`Theme::named`].
    pub fn named(theme: &str) -> Result<Self> {
        Theme::named(theme).map(Coloring::new)
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }
}

impl Default for Coloring {
    fn default() -> Self {
        Coloring::new(Theme::DEFAULT)
    }
}

impl Plugin for Coloring {
    fn apply(&self, line: String) -> Option<String> {
        let colored = self.levels.replace_all(&line, |caps: &Captures| {
            let level = &caps[0];
            format!("{}{}{}", self.theme.color(level), level, RESET)
        });

        Some(colored.into_owned())
    }
}
