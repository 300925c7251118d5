//! Wall-clock sources for the engine clock

use std::cell::Cell;
use std::rc::Rc;

/// Something that can report the current wall time in seconds
pub trait TimeSource {
    fn now_secs(&self) -> f64;
}

/// Real wall clock (`Date.now()` on web, `Instant` natively)
#[derive(Debug, Clone)]
pub struct WallClock {
    #[cfg(not(target_arch = "wasm32"))]
    origin: std::time::Instant,
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            origin: std::time::Instant::now(),
        }
    }
}

impl TimeSource for WallClock {
    #[cfg(target_arch = "wasm32")]
    fn now_secs(&self) -> f64 {
        js_sys::Date::now() / 1000.0
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now_secs(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Hand-driven time for headless runs and tests.
///
/// Clones share the same reading, so a test can keep one handle and give
/// another to the clock.
#[derive(Debug, Clone, Default)]
pub struct ManualTime {
    now: Rc<Cell<f64>>,
}

impl ManualTime {
    pub fn new(start: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, secs: f64) {
        self.now.set(secs);
    }

    pub fn advance(&self, secs: f64) {
        self.now.set(self.now.get() + secs);
    }
}

impl TimeSource for ManualTime {
    fn now_secs(&self) -> f64 {
        self.now.get()
    }
}
