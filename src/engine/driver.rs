//! Frame driver
//!
//! Runs a frame handler once per display refresh and reschedules it. The
//! scheduling primitive is injected: `requestAnimationFrame` or a ~60 Hz
//! timeout in the browser, a manually pumped queue headless and in tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::error::WorldError;

/// Work done once per frame (the game loop)
pub trait FrameHandler {
    fn frame(&mut self);
}

/// Host primitive that runs a callback at the next refresh opportunity.
///
/// Implementations must defer the callback, never run it inline.
pub trait Scheduler {
    fn schedule(&self, callback: Box<dyn FnOnce()>);
}

#[derive(Debug, Default)]
struct DriverState {
    running: Cell<bool>,
    /// Bumped on every start so callbacks from an earlier run die out
    generation: Cell<u64>,
    frames: Cell<u64>,
}

/// Self-rescheduling frame loop
#[derive(Clone)]
pub struct FrameDriver {
    scheduler: Rc<dyn Scheduler>,
    state: Rc<DriverState>,
}

impl FrameDriver {
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            scheduler,
            state: Rc::new(DriverState::default()),
        }
    }

    /// Run the first frame now, then one per scheduler callback until stopped
    pub fn start(&self, handler: Rc<RefCell<dyn FrameHandler>>) -> Result<(), WorldError> {
        if self.state.running.get() {
            log::warn!("Frame driver already running");
            return Err(WorldError::AlreadyRunning);
        }
        let generation = self.state.generation.get() + 1;
        self.state.generation.set(generation);
        self.state.running.set(true);
        log::info!("Frame driver started");

        run_frame(self.scheduler.clone(), self.state.clone(), handler, generation);
        Ok(())
    }

    /// Stop rescheduling; a callback already queued becomes a no-op
    pub fn stop(&self) {
        if self.state.running.replace(false) {
            log::info!("Frame driver stopped after {} frames", self.state.frames.get());
        }
    }

    /// Restart a stopped loop once `restart` has readied the handler.
    ///
    /// Returns `Ok(false)` without touching the handler when the loop is
    /// already running. If `restart` fails the driver stays stopped.
    pub fn resume<H: FrameHandler + 'static>(
        &self,
        handler: Rc<RefCell<H>>,
        restart: impl FnOnce(&mut H) -> Result<(), WorldError>,
    ) -> Result<bool, WorldError> {
        if self.is_running() {
            return Ok(false);
        }
        restart(&mut *handler.borrow_mut())?;
        self.start(handler)?;
        Ok(true)
    }

    pub fn is_running(&self) -> bool {
        self.state.running.get()
    }

    /// Frames run since creation
    pub fn frame_count(&self) -> u64 {
        self.state.frames.get()
    }
}

impl std::fmt::Debug for FrameDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameDriver").field("state", &self.state).finish()
    }
}

fn run_frame(
    scheduler: Rc<dyn Scheduler>,
    state: Rc<DriverState>,
    handler: Rc<RefCell<dyn FrameHandler>>,
    generation: u64,
) {
    let live = |state: &DriverState| state.running.get() && state.generation.get() == generation;
    if !live(&state) {
        return;
    }

    handler.borrow_mut().frame();
    state.frames.set(state.frames.get() + 1);

    // The handler may have stopped the driver
    if !live(&state) {
        return;
    }
    let next = scheduler.clone();
    scheduler.schedule(Box::new(move || run_frame(next, state, handler, generation)));
}

/// Scheduler backed by an explicit queue, pumped with `run_pending`
#[derive(Default)]
pub struct QueuedScheduler {
    queue: RefCell<VecDeque<Box<dyn FnOnce()>>>,
}

impl QueuedScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every callback queued before this call. Returns false if none were.
    pub fn run_pending(&self) -> bool {
        let batch: Vec<_> = self.queue.borrow_mut().drain(..).collect();
        let ran = !batch.is_empty();
        for callback in batch {
            callback();
        }
        ran
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }
}

impl Scheduler for QueuedScheduler {
    fn schedule(&self, callback: Box<dyn FnOnce()>) {
        self.queue.borrow_mut().push_back(callback);
    }
}

impl std::fmt::Debug for QueuedScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueuedScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        frames: u32,
        stop_at: Option<u32>,
        driver: Option<FrameDriver>,
        restarts: u32,
    }

    impl FrameHandler for Counter {
        fn frame(&mut self) {
            self.frames += 1;
            if Some(self.frames) == self.stop_at {
                if let Some(driver) = &self.driver {
                    driver.stop();
                }
            }
        }
    }

    fn setup() -> (Rc<QueuedScheduler>, FrameDriver, Rc<RefCell<Counter>>) {
        let scheduler = Rc::new(QueuedScheduler::new());
        let driver = FrameDriver::new(scheduler.clone());
        (scheduler, driver, Rc::new(RefCell::new(Counter::default())))
    }

    #[test]
    fn test_first_frame_runs_immediately_then_once_per_refresh() {
        let (scheduler, driver, counter) = setup();
        driver.start(counter.clone()).unwrap();
        assert_eq!(counter.borrow().frames, 1);
        assert_eq!(scheduler.pending(), 1);

        for _ in 0..3 {
            assert!(scheduler.run_pending());
        }
        assert_eq!(counter.borrow().frames, 4);
        assert_eq!(driver.frame_count(), 4);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_double_start_is_rejected() {
        let (scheduler, driver, counter) = setup();
        driver.start(counter.clone()).unwrap();
        assert_eq!(driver.start(counter.clone()), Err(WorldError::AlreadyRunning));
        scheduler.run_pending();
        assert_eq!(counter.borrow().frames, 2);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_stop_drops_queued_frame() {
        let (scheduler, driver, counter) = setup();
        driver.start(counter.clone()).unwrap();
        driver.stop();
        assert!(!driver.is_running());
        scheduler.run_pending();
        assert_eq!(counter.borrow().frames, 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_handler_can_stop_driver() {
        let (scheduler, driver, counter) = setup();
        {
            let mut c = counter.borrow_mut();
            c.stop_at = Some(3);
            c.driver = Some(driver.clone());
        }
        driver.start(counter.clone()).unwrap();
        while scheduler.run_pending() {}
        assert_eq!(counter.borrow().frames, 3);
        assert!(!driver.is_running());
    }

    #[test]
    fn test_restart_after_stop_runs_a_single_loop() {
        let (scheduler, driver, counter) = setup();
        driver.start(counter.clone()).unwrap();
        driver.stop();
        driver.start(counter.clone()).unwrap();
        // Stale callback from the first run plus the new one
        assert_eq!(scheduler.pending(), 2);
        scheduler.run_pending();
        assert_eq!(counter.borrow().frames, 3);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_resume_restarts_a_stopped_loop() {
        let (scheduler, driver, counter) = setup();
        driver.start(counter.clone()).unwrap();
        scheduler.run_pending();
        driver.stop();
        scheduler.run_pending();
        assert_eq!(counter.borrow().frames, 2);

        let resumed = driver.resume(counter.clone(), |c| {
            c.restarts += 1;
            Ok(())
        });
        assert_eq!(resumed, Ok(true));
        assert!(driver.is_running());
        assert_eq!(counter.borrow().restarts, 1);
        assert_eq!(counter.borrow().frames, 3);

        scheduler.run_pending();
        assert_eq!(counter.borrow().frames, 4);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_resume_while_running_leaves_handler_alone() {
        let (scheduler, driver, counter) = setup();
        driver.start(counter.clone()).unwrap();
        let resumed = driver.resume(counter.clone(), |c| {
            c.restarts += 1;
            Ok(())
        });
        assert_eq!(resumed, Ok(false));
        assert_eq!(counter.borrow().restarts, 0);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_failed_restart_keeps_driver_stopped() {
        let (scheduler, driver, counter) = setup();
        driver.start(counter.clone()).unwrap();
        driver.stop();
        let resumed = driver.resume(counter.clone(), |_| Err(WorldError::NotInitialized));
        assert_eq!(resumed, Err(WorldError::NotInitialized));
        assert!(!driver.is_running());
        scheduler.run_pending();
        assert_eq!(counter.borrow().frames, 1);
    }
}
