//! One Evil Aliens play session: spawning rules and HUD on top of the world

use std::f64::consts::TAU;
use std::rc::Rc;

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::actors::{Actor, ActorAssets, Alien, Arena, Earth, Sentry};
use crate::engine::{AssetLoader, Clock, SoundHandle, World, WorldPhase};
use crate::error::{AssetError, WorldError};
use crate::renderer::{Surface, TextStyle};
use crate::settings::Settings;

const HUD_COLOR: &str = "red";
const HUD_FONT: &str = "bold 2em Arial";
/// HUD inset from the left and bottom edges
const HUD_MARGIN: f64 = 50.0;
const HUD_LINE_HEIGHT: f64 = 30.0;

pub struct EvilAliens {
    world: World<Actor>,
    rng: Pcg32,
    /// Game time of the last alien spawn
    last_alien_at: Option<f64>,
    spawn_interval: f64,
}

impl EvilAliens {
    /// Build a session once the loader is done. Fails if any sprite is missing.
    pub fn new(
        clock: Clock,
        assets: &AssetLoader,
        settings: &Settings,
        seed: u64,
    ) -> Result<Self, AssetError> {
        let actor_assets = Rc::new(ActorAssets::resolve(assets)?);
        let arena = Arena::new(settings.starting_lives, actor_assets);
        let mut world = World::new(clock, assets.clone(), arena);
        world.set_show_outlines(settings.show_outlines);

        log::info!("New session with seed: {}", seed);
        Ok(Self {
            world,
            rng: Pcg32::seed_from_u64(seed),
            last_alien_at: None,
            spawn_interval: settings.alien_spawn_interval,
        })
    }

    pub fn init(&mut self, width: f64, height: f64) -> Result<(), WorldError> {
        self.world.init(width, height)
    }

    /// Place the planet and the sentry, then start the world
    pub fn start(&mut self) -> Result<(), WorldError> {
        let first_start = self.world.phase() == WorldPhase::Initialized;
        self.world.start()?;
        if first_start {
            let assets = Rc::clone(&self.world.shared().assets);
            self.world.add_entity(Actor::Earth(Earth::new(&assets)));
            self.world.add_entity(Actor::Sentry(Sentry::new(&assets)));
        }
        Ok(())
    }

    pub fn stop(&mut self) {
        self.world.stop();
    }

    /// Run one frame and return the sounds it queued
    pub fn frame(&mut self, surface: &mut dyn Surface) -> Result<Vec<SoundHandle>, WorldError> {
        self.world.step()?;
        self.spawn_alien_if_due();
        self.world.draw(surface, Some(&draw_hud));
        self.world.end_frame();
        Ok(self.world.take_sounds())
    }

    fn spawn_alien_if_due(&mut self) {
        if self.is_game_over() {
            return;
        }
        let now = self.world.game_time();
        let due = match self.last_alien_at {
            None => true,
            Some(last) => now - last > self.spawn_interval,
        };
        if !due {
            return;
        }

        let angle = self.rng.random_range(0.0..TAU);
        let distance = self.world.extents().width;
        let assets = Rc::clone(&self.world.shared().assets);
        self.world
            .add_entity(Actor::Alien(Alien::new(&assets, distance, angle)));
        self.last_alien_at = Some(now);
        log::debug!("Alien spawned at {:.2} rad", angle);
    }

    pub fn record_click(&mut self, pos: DVec2) {
        self.world.record_click(pos);
    }

    pub fn record_move(&mut self, pos: DVec2) {
        self.world.record_move(pos);
    }

    pub fn score(&self) -> u32 {
        self.world.shared().score
    }

    pub fn lives(&self) -> u32 {
        self.world.shared().lives
    }

    pub fn is_game_over(&self) -> bool {
        self.world.shared().is_game_over()
    }

    pub fn world(&self) -> &World<Actor> {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World<Actor> {
        &mut self.world
    }
}

impl std::fmt::Debug for EvilAliens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvilAliens")
            .field("world", &self.world)
            .field("score", &self.score())
            .field("lives", &self.lives())
            .field("last_alien_at", &self.last_alien_at)
            .finish()
    }
}

/// Score and lives in the bottom-left corner, "Game Over" in the middle
fn draw_hud(world: &World<Actor>, surface: &mut dyn Surface) {
    let (w, h) = surface.size();
    let arena = world.shared();
    let style = TextStyle::new(HUD_COLOR, HUD_FONT);
    let x = -w / 2.0 + HUD_MARGIN;
    let y = h / 2.0 - HUD_MARGIN;

    surface.fill_text(&format!("Score: {}", arena.score), x, y, &style);
    surface.fill_text(
        &format!("Lives: {}", arena.lives),
        x,
        y - HUD_LINE_HEIGHT,
        &style,
    );
    if arena.is_game_over() {
        surface.fill_text("Game Over", 0.0, 0.0, &style.centered());
    }
}
