//! Process memory sampling for the `%memory%` and `%memory_peak%` tokens
//!
//! Peak values are tracked process-wide so that every logger instance
//! reports the same high-water mark.

use std::sync::atomic::{AtomicU64, Ordering};
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Highest resident set size observed so far
static PEAK_RESIDENT: AtomicU64 = AtomicU64::new(0);

/// Highest virtual memory size observed so far
static PEAK_VIRTUAL: AtomicU64 = AtomicU64::new(0);

const UNITS: [(u32, &str); 4] = [(3, "GB"), (2, "MB"), (1, "KB"), (0, "B")];

/// Memory figures captured at the moment an entry is rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryReading {
    pub current: u64,
    pub peak: u64,
}

/// How memory figures are written into an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryDisplay {
    /// Human readable units instead of a raw byte count
    pub format: bool,
    /// Decimal places kept when formatting
    pub precision: usize,
}

impl Default for MemoryDisplay {
    fn default() -> Self {
        Self {
            format: true,
            precision: 2,
        }
    }
}

impl MemoryDisplay {
    pub fn render(&self, bytes: u64) -> String {
        if self.format {
            format_bytes(bytes, self.precision)
        } else {
            bytes.to_string()
        }
    }
}

/// Samples the current process through `sysinfo`
pub struct MemoryProbe {
    system: System,
    pid: Option<Pid>,
}

impl MemoryProbe {
    pub fn new() -> Self {
        Self {
            system: System::new(),
            pid: sysinfo::get_current_pid().ok(),
        }
    }

    /// Sample current usage and fold it into the process-wide peak.
    ///
    /// `real_usage` selects resident memory; otherwise virtual memory is used.
    pub fn sample(&mut self, real_usage: bool) -> MemoryReading {
        let current = self.current_usage(real_usage);
        let peak = if real_usage { &PEAK_RESIDENT } else { &PEAK_VIRTUAL };
        let previous = peak.fetch_max(current, Ordering::Relaxed);

        MemoryReading {
            current,
            peak: previous.max(current),
        }
    }

    fn current_usage(&mut self, real_usage: bool) -> u64 {
        let Some(pid) = self.pid else {
            return 0;
        };

        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );

        self.system
            .process(pid)
            .map(|process| {
                if real_usage {
                    process.memory()
                } else {
                    process.virtual_memory()
                }
            })
            .unwrap_or(0)
    }
}

impl Default for MemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a byte count in the largest unit (GB, MB, KB, B) it reaches.
///
/// The value is rounded half away from zero to `precision` decimals and
/// trailing zeros are dropped, so `1536` at precision 2 becomes `1.5KB`.
pub fn format_bytes(bytes: u64, precision: usize) -> String {
    for (pow, unit) in UNITS {
        let target = 1024u64.pow(pow);
        if bytes < target {
            continue;
        }

        let scaled = format!("{:.*}", precision, round_half_up(bytes as f64 / target as f64, precision));
        return format!("{}{}", trim_fraction(&scaled), unit);
    }

    format!("{}B", bytes)
}

// `{:.N}` alone rounds ties to even
fn round_half_up(value: f64, precision: usize) -> f64 {
    let factor = 10f64.powi(precision.min(15) as i32);
    (value * factor).round() / factor
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}
