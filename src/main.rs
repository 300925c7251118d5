//! Evil Aliens entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, Window};

    use evil_aliens::Settings;
    use evil_aliens::audio::AudioManager;
    use evil_aliens::engine::{AssetLoader, Clock, FrameDriver, FrameHandler};
    use evil_aliens::game::{self, EvilAliens};
    use evil_aliens::platform::WallClock;
    use evil_aliens::platform::web::{self, WebAssetSource, WebAssetStore};
    use evil_aliens::renderer::CanvasSurface;

    /// Game instance driven by the frame driver
    struct Game {
        session: EvilAliens,
        surface: CanvasSurface,
        audio: AudioManager,
        driver: FrameDriver,
    }

    impl FrameHandler for Game {
        fn frame(&mut self) {
            match self.session.frame(&mut self.surface) {
                Ok(sounds) => self.audio.play_all(&sounds),
                Err(e) => {
                    log::error!("Frame failed: {}", e);
                    self.driver.stop();
                }
            }
        }
    }

    fn to_js(e: impl std::fmt::Display) -> JsValue {
        JsValue::from_str(&e.to_string())
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Evil Aliens starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("surface")
            .ok_or("no #surface canvas")?
            .dyn_into()?;

        let settings = Settings::load();
        // Write back so the stored entry lists every field, sanitized
        settings.save();
        let store = WebAssetStore::new();
        let loader = AssetLoader::new();
        game::queue_all(&loader).map_err(to_js)?;

        // Gameplay starts only once every asset has settled
        let source = WebAssetSource::new(store.clone());
        let ready_loader = loader.clone();
        loader
            .load_all(&source, move || {
                if let Err(e) = start_game(window, canvas, store, &ready_loader, settings) {
                    log::error!("Could not start game: {:?}", e);
                }
            })
            .map_err(to_js)?;

        Ok(())
    }

    fn start_game(
        window: Window,
        canvas: HtmlCanvasElement,
        store: WebAssetStore,
        loader: &AssetLoader,
        settings: Settings,
    ) -> Result<(), JsValue> {
        if loader.error_count() > 0 {
            log::warn!("{} assets failed to load", loader.error_count());
        }

        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        let clock = Clock::new(Box::new(WallClock::new()), settings.max_step);
        let mut session = EvilAliens::new(clock, loader, &settings, seed).map_err(to_js)?;
        session
            .init(canvas.width() as f64, canvas.height() as f64)
            .map_err(to_js)?;
        session.start().map_err(to_js)?;

        let surface = CanvasSurface::new(&canvas, store.clone())?;
        let mut audio = AudioManager::new(store);
        audio.apply_settings(&settings);

        let driver = FrameDriver::new(web::best_scheduler(window.clone()));
        let game = Rc::new(RefCell::new(Game {
            session,
            surface,
            audio,
            driver: driver.clone(),
        }));

        setup_input_handlers(&canvas, game.clone())?;
        setup_teardown(&window, game.clone())?;

        driver.start(game).map_err(to_js)?;
        log::info!("Evil Aliens running!");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        {
            let game = game.clone();
            web::on_pointer(canvas, "click", move |pos| {
                game.borrow_mut().session.record_click(pos);
            })?;
        }
        web::on_pointer(canvas, "mousemove", move |pos| {
            game.borrow_mut().session.record_move(pos);
        })
    }

    fn setup_teardown(window: &Window, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        {
            let game = game.clone();
            web::on_page_hide(window, move || {
                let mut g = game.borrow_mut();
                g.driver.stop();
                g.session.stop();
            })?;
        }

        // Pages restored from the back/forward cache keep their state but need the loop back
        web::on_page_show(window, move |persisted| {
            if !persisted {
                return;
            }
            let driver = game.borrow().driver.clone();
            match driver.resume(game.clone(), |g| g.session.start()) {
                Ok(true) => log::info!("Resumed after back/forward navigation"),
                Ok(false) => {}
                Err(e) => log::error!("Could not resume: {}", e),
            }
        })
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::cell::{Cell, RefCell};
    use std::error::Error;
    use std::rc::Rc;

    use evil_aliens::Settings;
    use evil_aliens::WorldError;
    use evil_aliens::audio::AudioManager;
    use evil_aliens::engine::{AssetLoader, Clock, FrameDriver, FrameHandler, QueuedScheduler};
    use evil_aliens::game::{self, Autopilot, EvilAliens};
    use evil_aliens::platform::ManualTime;
    use evil_aliens::renderer::RecordingSurface;

    const WIDTH: f64 = 800.0;
    const HEIGHT: f64 = 600.0;
    /// Simulated display refresh (60 Hz)
    const FRAME_SECS: f64 = 1.0 / 60.0;

    /// Game driven by simulated time
    struct HeadlessGame {
        session: EvilAliens,
        surface: RecordingSurface,
        audio: AudioManager,
        time: ManualTime,
        driver: FrameDriver,
        pilot: Option<Autopilot>,
        frames_left: u64,
        error: Option<WorldError>,
    }

    impl FrameHandler for HeadlessGame {
        fn frame(&mut self) {
            self.time.advance(FRAME_SECS);
            if let Some(pilot) = &mut self.pilot {
                pilot.steer(&mut self.session);
            }
            // Keep only the latest frame's draw calls
            self.surface.commands.clear();

            match self.session.frame(&mut self.surface) {
                Ok(sounds) => self.audio.play_all(&sounds),
                Err(e) => {
                    self.error = Some(e);
                    self.driver.stop();
                    return;
                }
            }

            self.frames_left = self.frames_left.saturating_sub(1);
            if self.frames_left == 0 || self.session.is_game_over() {
                self.driver.stop();
            }
        }
    }

    /// How a headless run ended
    #[derive(Debug)]
    pub struct Outcome {
        pub frames: u64,
        pub game_time: f64,
        pub score: u32,
        pub lives: u32,
        pub game_over: bool,
        pub sounds: u64,
    }

    fn wall_seed() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    /// Play until `frames` have run or the game is over
    pub fn play(
        settings: &Settings,
        frames: u64,
        pilot: Option<Autopilot>,
    ) -> Result<Outcome, Box<dyn Error>> {
        let loader = AssetLoader::new();
        game::queue_all(&loader)?;
        let ready = Rc::new(Cell::new(false));
        {
            let ready = ready.clone();
            loader.load_all(&game::headless_source(), move || ready.set(true))?;
        }
        if !ready.get() {
            return Err("assets did not settle".into());
        }

        let time = ManualTime::new(0.0);
        let clock = Clock::new(Box::new(time.clone()), settings.max_step);
        let seed = settings.seed.unwrap_or_else(wall_seed);
        let mut session = EvilAliens::new(clock, &loader, settings, seed)?;
        session.init(WIDTH, HEIGHT)?;
        session.start()?;

        let mut audio = AudioManager::new();
        audio.apply_settings(settings);

        let scheduler = Rc::new(QueuedScheduler::new());
        let driver = FrameDriver::new(scheduler.clone());
        let game = Rc::new(RefCell::new(HeadlessGame {
            session,
            surface: RecordingSurface::new(WIDTH, HEIGHT),
            audio,
            time,
            driver: driver.clone(),
            pilot,
            frames_left: frames,
            error: None,
        }));

        driver.start(game.clone())?;
        while scheduler.run_pending() {}

        let g = game.borrow();
        if let Some(e) = g.error {
            return Err(e.into());
        }
        Ok(Outcome {
            frames: driver.frame_count(),
            game_time: g.session.world().game_time(),
            score: g.session.score(),
            lives: g.session.lives(),
            game_over: g.session.is_game_over(),
            sounds: g.audio.played(),
        })
    }

    pub fn run(frames: u64) -> Result<(), Box<dyn Error>> {
        let settings = Settings::load();
        settings.save();

        let outcome = play(&settings, frames, Some(Autopilot::new()))?;
        log::info!(
            "Finished after {} frames ({:.1}s game time): score {}, lives {}, {} sounds played",
            outcome.frames,
            outcome.game_time,
            outcome.score,
            outcome.lives,
            outcome.sounds
        );
        if outcome.game_over {
            log::info!("Game over");
        }
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Evil Aliens (headless) starting...");

    // One minute of play at 60 Hz
    if let Err(e) = headless::run(60 * 60) {
        log::error!("Headless run failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
