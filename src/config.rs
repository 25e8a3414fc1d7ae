//! Diagnostics configuration shared by events, readers and writers.
//!
//! Warnings and errors are reported through `tracing`; `Config` only decides
//! whether a given diagnostic is emitted at all.

/// Per-object diagnostic switches and output precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub print_warnings: bool,
    pub print_errors: bool,
    /// Debug messages at or below this level are emitted.
    pub debug_level: u32,
    /// Significant digits after the decimal point for written floats.
    pub precision: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self { print_warnings: true, print_errors: true, debug_level: 0, precision: 16 }
    }
}

impl Config {
    /// Everything off.
    pub fn quiet() -> Self {
        Self { print_warnings: false, print_errors: false, ..Self::default() }
    }

    pub fn with_warnings(mut self, on: bool) -> Self {
        self.print_warnings = on;
        self
    }

    pub fn with_errors(mut self, on: bool) -> Self {
        self.print_errors = on;
        self
    }

    pub fn with_debug_level(mut self, level: u32) -> Self {
        self.debug_level = level;
        self
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision.clamp(1, 24);
        self
    }
}

/// `tracing::warn!` gated on `print_warnings`.
macro_rules! cfg_warn {
    ($cfg:expr, $($arg:tt)+) => {
        if $cfg.print_warnings {
            tracing::warn!($($arg)+);
        }
    };
}

/// `tracing::error!` gated on `print_errors`.
macro_rules! cfg_error {
    ($cfg:expr, $($arg:tt)+) => {
        if $cfg.print_errors {
            tracing::error!($($arg)+);
        }
    };
}

/// `tracing::debug!` gated on `debug_level`.
macro_rules! cfg_debug {
    ($cfg:expr, $level:expr, $($arg:tt)+) => {
        if $cfg.debug_level >= $level {
            tracing::debug!($($arg)+);
        }
    };
}

pub(crate) use {cfg_debug, cfg_error, cfg_warn};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let c = Config::default().with_warnings(false).with_debug_level(3).with_precision(8);
        assert!(!c.print_warnings);
        assert!(c.print_errors);
        assert_eq!(c.debug_level, 3);
        assert_eq!(c.precision, 8);
        assert_eq!(Config::default().with_precision(0).precision, 1);
        assert_eq!(Config::quiet().print_errors, false);
    }
}
