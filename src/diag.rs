// SPDX-License-Identifier: MIT OR Apache-2.0

//! Diagnostic tracing of register accesses and configuration results.
//!
//! Diagnostics are routed through the [`log`] facade but stay silent until
//! [`enable`] is called. The switch is process wide, it applies to every
//! chip handle at once.
#![macro_use]
#![allow(unused_macros)]

use core::sync::atomic::{AtomicBool, Ordering};

static ENABLED: AtomicBool = AtomicBool::new(false);

/// Enables diagnostic output for all chips in this process.
pub fn enable() {
    ENABLED.store(true, Ordering::Relaxed);
}

/// Silences diagnostic output again.
pub fn disable() {
    ENABLED.store(false, Ordering::Relaxed);
}

/// Returns whether diagnostic output is enabled.
#[must_use]
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

macro_rules! trace {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            if $crate::diag::is_enabled() {
                ::log::trace!($s $(, $x)*);
            }
        }
    };
}

macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            if $crate::diag::is_enabled() {
                ::log::debug!($s $(, $x)*);
            }
        }
    };
}

macro_rules! warn {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            if $crate::diag::is_enabled() {
                ::log::warn!($s $(, $x)*);
            }
        }
    };
}
