//! The entity world and its per-frame loop
//!
//! Frame order:
//! 1. Clock tick (clamped delta)
//! 2. Update every entity present at the start of the pass, in insertion order
//! 3. Drop every entity flagged for removal, keeping survivor order
//! 4. Draw survivors centered on the surface, then the overlay (HUD)
//! 5. Forget the click recorded for this frame

use glam::DVec2;

use super::assets::{AssetLoader, SoundHandle};
use super::clock::Clock;
use super::entity::{Entity, FrameContext};
use super::input::{Extents, InputState};
use crate::error::WorldError;
use crate::renderer::Surface;

/// World lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldPhase {
    /// Created, no surface yet
    Uninitialized,
    /// Surface dimensions captured, loop not started
    Initialized,
    /// Frames are being driven
    Running,
    /// Host tore the session down
    Stopped,
}

/// Owns every live entity plus the clock, input and shared session state
pub struct World<E: Entity> {
    entities: Vec<E>,
    clock: Clock,
    assets: AssetLoader,
    input: InputState,
    shared: E::Shared,
    extents: Extents,
    phase: WorldPhase,
    frame_delta: f64,
    /// Sounds queued by entities this frame
    sounds: Vec<SoundHandle>,
    show_outlines: bool,
}

impl<E: Entity> World<E> {
    pub fn new(clock: Clock, assets: AssetLoader, shared: E::Shared) -> Self {
        Self {
            entities: Vec::new(),
            clock,
            assets,
            input: InputState::default(),
            shared,
            extents: Extents::default(),
            phase: WorldPhase::Uninitialized,
            frame_delta: 0.0,
            sounds: Vec::new(),
            show_outlines: false,
        }
    }

    /// Capture the drawing surface dimensions
    pub fn init(&mut self, width: f64, height: f64) -> Result<(), WorldError> {
        if self.phase != WorldPhase::Uninitialized {
            return Err(WorldError::AlreadyInitialized);
        }
        self.extents = Extents::new(width, height);
        self.phase = WorldPhase::Initialized;
        log::info!("Game initialized ({}x{})", width, height);
        Ok(())
    }

    /// Enter the running state.
    ///
    /// A second start is rejected rather than silently driving the world
    /// from two loops.
    pub fn start(&mut self) -> Result<(), WorldError> {
        match self.phase {
            WorldPhase::Uninitialized => Err(WorldError::NotInitialized),
            WorldPhase::Running => {
                log::warn!("start() called on a running world");
                Err(WorldError::AlreadyRunning)
            }
            WorldPhase::Initialized | WorldPhase::Stopped => {
                // Time spent before the first frame is not game time
                self.clock.rebase();
                self.phase = WorldPhase::Running;
                log::info!("Starting game");
                Ok(())
            }
        }
    }

    pub fn stop(&mut self) {
        if self.phase == WorldPhase::Running {
            self.phase = WorldPhase::Stopped;
            log::info!("Game stopped at {:.2}s", self.clock.game_time());
        }
    }

    pub fn phase(&self) -> WorldPhase {
        self.phase
    }

    pub fn add_entity(&mut self, entity: E) {
        self.entities.push(entity);
    }

    pub fn entities(&self) -> &[E] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [E] {
        &mut self.entities
    }

    pub fn shared(&self) -> &E::Shared {
        &self.shared
    }

    pub fn shared_mut(&mut self) -> &mut E::Shared {
        &mut self.shared
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn assets(&self) -> &AssetLoader {
        &self.assets
    }

    pub fn extents(&self) -> Extents {
        self.extents
    }

    /// Delta produced by the most recent clock tick
    pub fn frame_delta(&self) -> f64 {
        self.frame_delta
    }

    pub fn game_time(&self) -> f64 {
        self.clock.game_time()
    }

    pub fn set_show_outlines(&mut self, show: bool) {
        self.show_outlines = show;
    }

    /// Record a click in world coordinates (visible to the next update only)
    pub fn record_click(&mut self, pos: DVec2) {
        self.input.record_click(pos);
    }

    /// Record the latest pointer position in world coordinates
    pub fn record_move(&mut self, pos: DVec2) {
        self.input.record_move(pos);
    }

    /// Sounds queued since the last call
    pub fn take_sounds(&mut self) -> Vec<SoundHandle> {
        std::mem::take(&mut self.sounds)
    }

    /// Tick the clock and run one update pass
    pub fn step(&mut self) -> Result<f64, WorldError> {
        if self.phase != WorldPhase::Running {
            return Err(WorldError::NotRunning);
        }
        self.frame_delta = self.clock.tick();
        self.update();
        Ok(self.frame_delta)
    }

    /// One update pass followed by compaction.
    ///
    /// Only the entities present when the pass starts are updated; anything
    /// spawned during the pass is updated from the next frame on. Entities
    /// flagged before their turn are skipped.
    pub fn update(&mut self) {
        let count = self.entities.len();
        let game_time = self.clock.game_time();

        for i in 0..count {
            if self.entities[i].removal_requested() {
                continue;
            }

            let mut spawned = Vec::new();
            let (before, rest) = self.entities.split_at_mut(i);
            if let Some((current, after)) = rest.split_first_mut() {
                let mut ctx = FrameContext {
                    delta: self.frame_delta,
                    game_time,
                    input: &self.input,
                    extents: self.extents,
                    assets: &self.assets,
                    shared: &mut self.shared,
                    sounds: &mut self.sounds,
                    before,
                    after,
                    spawned: &mut spawned,
                };
                current.update(&mut ctx);
            }
            self.entities.append(&mut spawned);
        }

        self.entities.retain(|e| !e.removal_requested());
    }

    /// Clear the surface and draw every entity with the origin at its center.
    ///
    /// `overlay` runs last, still in centered coordinates.
    pub fn draw(
        &self,
        surface: &mut dyn Surface,
        overlay: Option<&dyn Fn(&World<E>, &mut dyn Surface)>,
    ) {
        let (width, height) = surface.size();
        surface.clear();
        surface.save();
        surface.translate(width / 2.0, height / 2.0);

        for entity in &self.entities {
            entity.draw(surface);
            if self.show_outlines {
                if let Some(radius) = entity.radius() {
                    surface.stroke_circle(entity.position(), radius, "green");
                }
            }
        }

        if let Some(overlay) = overlay {
            overlay(self, &mut *surface);
        }

        surface.restore();
    }

    /// Close the frame: the click is a one-frame signal
    pub fn end_frame(&mut self) {
        self.input.clear_click();
    }

    /// Full frame: step, draw, end
    pub fn frame(
        &mut self,
        surface: &mut dyn Surface,
        overlay: Option<&dyn Fn(&World<E>, &mut dyn Surface)>,
    ) -> Result<(), WorldError> {
        self.step()?;
        self.draw(surface, overlay);
        self.end_frame();
        Ok(())
    }
}

impl<E: Entity> std::fmt::Debug for World<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("phase", &self.phase)
            .field("entities", &self.entities.len())
            .field("clock", &self.clock)
            .field("extents", &self.extents)
            .finish()
    }
}
