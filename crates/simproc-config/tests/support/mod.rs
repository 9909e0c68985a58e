//! Environment override helpers shared by the configuration suites.

use std::ffi::OsString;
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Variables the loader reads; cleared for every test so the host
/// environment cannot leak into assertions.
const MANAGED_KEYS: &[&str] = &[
    "HOST",
    "PORT",
    "CONFIG_PATH",
    "FALLBACK_CONFIG_PATH",
    "SIMPROC_LOG",
    "SIMPROC_LOG_FORMAT",
];

/// Serialises environment mutation and restores every managed variable on drop.
pub struct EnvScope {
    previous: Vec<(&'static str, Option<OsString>)>,
    _guard: MutexGuard<'static, ()>,
}

impl EnvScope {
    pub fn clean() -> Self {
        let guard = ENV_MUTEX
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let previous = MANAGED_KEYS
            .iter()
            .map(|key| (*key, std::env::var_os(key)))
            .collect();
        for key in MANAGED_KEYS {
            // Environment mutation is unsafe under edition 2024; the mutex
            // keeps tests in this binary from racing each other.
            unsafe { std::env::remove_var(key) };
        }
        Self {
            previous,
            _guard: guard,
        }
    }

    pub fn set(&self, key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) };
    }
}

impl Drop for EnvScope {
    fn drop(&mut self) {
        for (key, value) in self.previous.drain(..) {
            match value {
                Some(value) => unsafe { std::env::set_var(key, value) },
                None => unsafe { std::env::remove_var(key) },
            }
        }
    }
}
