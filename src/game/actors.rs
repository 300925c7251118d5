//! Evil Aliens actors
//!
//! Every actor is a variant of `Actor`; each variant carries a `Body` and its
//! own motion and animation state. Session state shared by all actors
//! (score, lives, sprites) lives in `Arena`.

use std::f64::consts::FRAC_PI_2;
use std::rc::Rc;

use glam::DVec2;

use super::manifest::*;
use crate::consts::*;
use crate::engine::{Animation, AssetLoader, Body, Entity, FrameContext, ImageHandle, SoundHandle};
use crate::error::AssetError;
use crate::renderer::{Surface, draw_centered, with_rotation_about};
use crate::{circles_overlap, positive_angle};

/// Resolved sprites and sounds
#[derive(Debug, Clone)]
pub struct ActorAssets {
    pub alien: ImageHandle,
    pub alien_explosion: ImageHandle,
    pub bullet: ImageHandle,
    pub earth: ImageHandle,
    pub explosion: ImageHandle,
    pub sentry: ImageHandle,
    /// Sounds are optional: a failed sound just stays silent
    pub alien_boom: Option<SoundHandle>,
    pub bullet_boom: Option<SoundHandle>,
    pub bullet_fired: Option<SoundHandle>,
}

impl ActorAssets {
    /// Look up everything the actors need. Every image must have loaded.
    pub fn resolve(loader: &AssetLoader) -> Result<Self, AssetError> {
        let sound = |key: &str| match loader.sound(key) {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("Playing without sound: {}", e);
                None
            }
        };

        Ok(Self {
            alien: loader.image(ALIEN_IMAGE)?,
            alien_explosion: loader.image(ALIEN_EXPLOSION_IMAGE)?,
            bullet: loader.image(BULLET_IMAGE)?,
            earth: loader.image(EARTH_IMAGE)?,
            explosion: loader.image(EXPLOSION_IMAGE)?,
            sentry: loader.image(SENTRY_IMAGE)?,
            alien_boom: sound(ALIEN_BOOM_SOUND),
            bullet_boom: sound(BULLET_BOOM_SOUND),
            bullet_fired: sound(BULLET_SOUND),
        })
    }
}

/// Session state visible to every actor
#[derive(Debug, Clone)]
pub struct Arena {
    pub score: u32,
    pub lives: u32,
    pub assets: Rc<ActorAssets>,
}

impl Arena {
    pub fn new(lives: u32, assets: Rc<ActorAssets>) -> Self {
        Self {
            score: 0,
            lives,
            assets,
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.lives == 0
    }
}

type Ctx<'a, 'b> = &'a mut FrameContext<'b, Actor>;

fn play(ctx: Ctx<'_, '_>, sound: &Option<SoundHandle>) {
    if let Some(sound) = sound {
        ctx.play(sound);
    }
}

/// The planet at the origin
#[derive(Debug, Clone)]
pub struct Earth {
    body: Body,
    sprite: ImageHandle,
}

impl Earth {
    pub fn new(assets: &ActorAssets) -> Self {
        Self {
            body: Body::new(DVec2::ZERO, EARTH_RADIUS),
            sprite: assets.earth.clone(),
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        draw_centered(surface, &self.sprite, self.body.position);
    }
}

/// Turret orbiting the planet, aimed with the pointer, firing on click
#[derive(Debug, Clone)]
pub struct Sentry {
    body: Body,
    angle: f64,
    sprite: ImageHandle,
}

impl Sentry {
    pub fn new(assets: &ActorAssets) -> Self {
        Self {
            body: Body::new(DVec2::new(0.0, SENTRY_DISTANCE), assets.sentry.width() / 2.0),
            angle: 0.0,
            sprite: assets.sentry.clone(),
        }
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    fn update(&mut self, ctx: Ctx<'_, '_>) {
        let input = *ctx.input();
        if let Some(mouse) = input.mouse {
            self.angle = positive_angle(mouse.y.atan2(mouse.x));
            self.body.set_polar(SENTRY_DISTANCE, self.angle);
        }
        if let Some(target) = input.click {
            let assets = Rc::clone(&ctx.shared().assets);
            ctx.spawn(Actor::Bullet(Bullet::new(
                &assets,
                self.body.position,
                self.angle,
                target,
            )));
            play(ctx, &assets.bullet_fired);
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let pos = self.body.position;
        with_rotation_about(surface, pos, self.angle + FRAC_PI_2, |s| {
            draw_centered(s, &self.sprite, pos)
        });
    }
}

/// Invader closing in on the planet along a fixed angle
#[derive(Debug, Clone)]
pub struct Alien {
    body: Body,
    radial_distance: f64,
    angle: f64,
    speed: f64,
    sprite: ImageHandle,
}

impl Alien {
    pub fn new(assets: &ActorAssets, radial_distance: f64, angle: f64) -> Self {
        let mut body = Body::new(DVec2::ZERO, assets.alien.height() / 2.0);
        body.set_polar(radial_distance, angle);
        Self {
            body,
            radial_distance,
            angle,
            speed: ALIEN_SPEED,
            sprite: assets.alien.clone(),
        }
    }

    pub fn radial_distance(&self) -> f64 {
        self.radial_distance
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    fn hit_planet(&self) -> bool {
        circles_overlap(self.body.position, self.body.radius, DVec2::ZERO, EARTH_RADIUS)
    }

    /// Blow up: flag for removal and hand back the explosion to spawn
    pub fn explode(&mut self, assets: &ActorAssets) -> AlienExplosion {
        self.body.request_removal();
        AlienExplosion::new(assets, self.body.position)
    }

    fn update(&mut self, ctx: Ctx<'_, '_>) {
        // Position trails the distance by one frame
        self.body.set_polar(self.radial_distance, self.angle);
        self.radial_distance -= self.speed * ctx.delta();

        if self.hit_planet() {
            self.body.request_removal();
            let arena = ctx.shared_mut();
            arena.lives = arena.lives.saturating_sub(1);
            log::debug!("Alien reached the planet, {} lives left", arena.lives);
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let pos = self.body.position;
        with_rotation_about(surface, pos, self.angle + FRAC_PI_2, |s| {
            draw_centered(s, &self.sprite, pos)
        });
    }
}

/// One-shot explosion left where an alien died
#[derive(Debug, Clone)]
pub struct AlienExplosion {
    body: Body,
    animation: Animation,
}

impl AlienExplosion {
    pub fn new(assets: &ActorAssets, position: DVec2) -> Self {
        Self {
            body: Body::new(position, ALIEN_EXPLOSION_FRAME_WIDTH / 2.0),
            animation: Animation::new(
                assets.alien_explosion.clone(),
                ALIEN_EXPLOSION_FRAME_WIDTH,
                FRAME_DURATION,
                false,
            ),
        }
    }

    fn update(&mut self, ctx: Ctx<'_, '_>) {
        if self.animation.is_done() {
            self.body.request_removal();
            return;
        }
        self.animation.advance(ctx.delta());
    }

    fn draw(&self, surface: &mut dyn Surface) {
        self.animation.draw(surface, self.body.position, 1.0);
    }
}

/// Shot travelling outward from the sentry towards the clicked point
#[derive(Debug, Clone)]
pub struct Bullet {
    body: Body,
    angle: f64,
    target: DVec2,
    radial_distance: f64,
    speed: f64,
    animation: Animation,
}

impl Bullet {
    pub fn new(assets: &ActorAssets, position: DVec2, angle: f64, target: DVec2) -> Self {
        Self {
            // No collision circle: only the explosion it leaves behind hits
            body: Body::new(position, 0.0),
            angle,
            target,
            radial_distance: BULLET_START_DISTANCE,
            speed: BULLET_SPEED,
            animation: Animation::new(
                assets.bullet.clone(),
                BULLET_FRAME_WIDTH,
                FRAME_DURATION,
                true,
            ),
        }
    }

    pub fn target(&self) -> DVec2 {
        self.target
    }

    fn reached_target(&self) -> bool {
        let pos = self.body.position;
        pos.x.abs() >= self.target.x.abs() || pos.y.abs() >= self.target.y.abs()
    }

    fn update(&mut self, ctx: Ctx<'_, '_>) {
        if self.body.is_outside(&ctx.extents()) {
            self.body.request_removal();
        } else if self.reached_target() {
            let assets = Rc::clone(&ctx.shared().assets);
            ctx.spawn(Actor::BulletExplosion(BulletExplosion::new(&assets, self.target)));
            play(ctx, &assets.bullet_boom);
            self.body.request_removal();
        } else {
            self.body.set_polar(self.radial_distance, self.angle);
            self.radial_distance += self.speed * ctx.delta();
        }
        self.animation.advance(ctx.delta());
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let pos = self.body.position;
        with_rotation_about(surface, pos, self.angle + FRAC_PI_2, |s| {
            self.animation.draw(s, pos, 1.0)
        });
    }
}

/// Growing blast that destroys every alien it touches
#[derive(Debug, Clone)]
pub struct BulletExplosion {
    body: Body,
    animation: Animation,
}

impl BulletExplosion {
    pub fn new(assets: &ActorAssets, position: DVec2) -> Self {
        Self {
            body: Body::new(position, BULLET_EXPLOSION_FRAME_WIDTH / 2.0),
            animation: Animation::new(
                assets.explosion.clone(),
                BULLET_EXPLOSION_FRAME_WIDTH,
                FRAME_DURATION,
                false,
            ),
        }
    }

    /// Blast grows by a third of its base size every frame
    pub fn scale_factor(&self) -> f64 {
        1.0 + self.animation.current_frame() as f64 / 3.0
    }

    fn update(&mut self, ctx: Ctx<'_, '_>) {
        if self.animation.is_done() {
            self.body.request_removal();
            return;
        }
        self.body.radius = self.animation.frame_width() / 2.0 * self.scale_factor();

        let assets = Rc::clone(&ctx.shared().assets);
        let explosions: Vec<AlienExplosion> = ctx
            .siblings_mut()
            .filter_map(|actor| match actor {
                Actor::Alien(alien)
                    if !alien.body.removal_requested() && self.body.overlaps(&alien.body) =>
                {
                    Some(alien.explode(&assets))
                }
                _ => None,
            })
            .collect();

        for explosion in explosions {
            ctx.shared_mut().score += SCORE_PER_ALIEN;
            ctx.spawn(Actor::AlienExplosion(explosion));
            play(ctx, &assets.alien_boom);
        }
        self.animation.advance(ctx.delta());
    }

    fn draw(&self, surface: &mut dyn Surface) {
        self.animation
            .draw(surface, self.body.position, self.scale_factor());
    }
}

/// Everything that lives in the Evil Aliens world
#[derive(Debug, Clone)]
pub enum Actor {
    Earth(Earth),
    Sentry(Sentry),
    Alien(Alien),
    AlienExplosion(AlienExplosion),
    Bullet(Bullet),
    BulletExplosion(BulletExplosion),
}

impl Actor {
    pub fn is_alien(&self) -> bool {
        matches!(self, Actor::Alien(_))
    }

    pub fn as_sentry(&self) -> Option<&Sentry> {
        match self {
            Actor::Sentry(sentry) => Some(sentry),
            _ => None,
        }
    }
}

impl Entity for Actor {
    type Shared = Arena;

    fn body(&self) -> &Body {
        match self {
            Actor::Earth(a) => &a.body,
            Actor::Sentry(a) => &a.body,
            Actor::Alien(a) => &a.body,
            Actor::AlienExplosion(a) => &a.body,
            Actor::Bullet(a) => &a.body,
            Actor::BulletExplosion(a) => &a.body,
        }
    }

    fn body_mut(&mut self) -> &mut Body {
        match self {
            Actor::Earth(a) => &mut a.body,
            Actor::Sentry(a) => &mut a.body,
            Actor::Alien(a) => &mut a.body,
            Actor::AlienExplosion(a) => &mut a.body,
            Actor::Bullet(a) => &mut a.body,
            Actor::BulletExplosion(a) => &mut a.body,
        }
    }

    fn update(&mut self, ctx: &mut FrameContext<'_, Self>) {
        match self {
            Actor::Earth(_) => {}
            Actor::Sentry(a) => a.update(ctx),
            Actor::Alien(a) => a.update(ctx),
            Actor::AlienExplosion(a) => a.update(ctx),
            Actor::Bullet(a) => a.update(ctx),
            Actor::BulletExplosion(a) => a.update(ctx),
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        match self {
            Actor::Earth(a) => a.draw(surface),
            Actor::Sentry(a) => a.draw(surface),
            Actor::Alien(a) => a.draw(surface),
            Actor::AlienExplosion(a) => a.draw(surface),
            Actor::Bullet(a) => a.draw(surface),
            Actor::BulletExplosion(a) => a.draw(surface),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Clock, World};
    use crate::platform::ManualTime;
    use std::f64::consts::PI;

    fn loaded_assets() -> Rc<ActorAssets> {
        let loader = AssetLoader::new();
        queue_all(&loader).unwrap();
        loader.load_all(&headless_source(), || {}).unwrap();
        Rc::new(ActorAssets::resolve(&loader).unwrap())
    }

    fn arena_world(assets: &Rc<ActorAssets>) -> (World<Actor>, ManualTime) {
        let time = ManualTime::new(0.0);
        let clock = Clock::new(Box::new(time.clone()), MAX_STEP);
        let mut world = World::new(clock, AssetLoader::new(), Arena::new(10, assets.clone()));
        world.init(800.0, 600.0).unwrap();
        world.start().unwrap();
        (world, time)
    }

    fn step(world: &mut World<Actor>, time: &ManualTime, dt: f64) {
        time.advance(dt);
        world.step().unwrap();
        world.end_frame();
    }

    fn sound_keys(world: &mut World<Actor>) -> Vec<String> {
        world
            .take_sounds()
            .iter()
            .map(|s| s.key().to_string())
            .collect()
    }

    #[test]
    fn test_resolve_requires_images_but_not_sounds() {
        let loader = AssetLoader::new();
        queue_all(&loader).unwrap();
        let images_only = SPRITE_SIZES
            .iter()
            .fold(crate::platform::HeadlessAssetSource::new(), |s, &(k, w, h)| {
                s.with_image(k, w, h)
            });
        loader.load_all(&images_only, || {}).unwrap();

        let assets = ActorAssets::resolve(&loader).unwrap();
        assert!(assets.bullet_fired.is_none());
        assert_eq!(assets.alien.height(), 40.0);

        let empty = AssetLoader::new();
        empty.load_all(&images_only, || {}).unwrap();
        assert!(matches!(
            ActorAssets::resolve(&empty),
            Err(AssetError::NotFound(_))
        ));
    }

    #[test]
    fn test_alien_position_trails_radial_distance() {
        let assets = loaded_assets();
        let (mut world, time) = arena_world(&assets);
        world.add_entity(Actor::Alien(Alien::new(&assets, 300.0, 0.0)));

        step(&mut world, &time, 0.05);
        let Actor::Alien(alien) = &world.entities()[0] else {
            panic!("expected alien");
        };
        assert!((alien.body.position.x - 300.0).abs() < 1e-9);
        assert!((alien.radial_distance() - 295.0).abs() < 1e-6);

        step(&mut world, &time, 0.05);
        assert!((world.entities()[0].position().x - 295.0).abs() < 1e-6);
    }

    #[test]
    fn test_alien_hitting_planet_costs_a_life() {
        let assets = loaded_assets();
        let (mut world, time) = arena_world(&assets);
        // Alien radius 20 + planet 67 = 87
        world.add_entity(Actor::Alien(Alien::new(&assets, 86.0, PI)));
        world.add_entity(Actor::Alien(Alien::new(&assets, 88.0, 0.0)));

        step(&mut world, &time, 0.01);
        assert_eq!(world.shared().lives, 9);
        assert_eq!(world.entities().len(), 1);
        assert_eq!(world.entities()[0].position(), DVec2::new(88.0, 0.0));
    }

    #[test]
    fn test_lives_never_underflow() {
        let assets = loaded_assets();
        let (mut world, time) = arena_world(&assets);
        world.shared_mut().lives = 0;
        world.add_entity(Actor::Alien(Alien::new(&assets, 10.0, 0.0)));
        step(&mut world, &time, 0.01);
        assert_eq!(world.shared().lives, 0);
        assert!(world.shared().is_game_over());
    }

    #[test]
    fn test_sentry_follows_pointer_angle() {
        let assets = loaded_assets();
        let (mut world, time) = arena_world(&assets);
        world.add_entity(Actor::Sentry(Sentry::new(&assets)));
        world.record_move(DVec2::new(0.0, -10.0));

        step(&mut world, &time, 0.016);
        let sentry = world.entities()[0].as_sentry().unwrap();
        assert!((sentry.angle() - 1.5 * PI).abs() < 1e-9);
        assert!((sentry.body.position - DVec2::new(0.0, -SENTRY_DISTANCE)).length() < 1e-9);
    }

    #[test]
    fn test_sentry_fires_on_click_only() {
        let assets = loaded_assets();
        let (mut world, time) = arena_world(&assets);
        world.add_entity(Actor::Sentry(Sentry::new(&assets)));

        step(&mut world, &time, 0.016);
        assert_eq!(world.entities().len(), 1);

        world.record_click(DVec2::new(0.0, 200.0));
        step(&mut world, &time, 0.016);
        assert!(matches!(&world.entities()[1], Actor::Bullet(b) if b.target() == DVec2::new(0.0, 200.0)));
        assert_eq!(sound_keys(&mut world), vec![BULLET_SOUND]);

        // Click was consumed
        step(&mut world, &time, 0.016);
        assert_eq!(world.entities().len(), 2);
    }

    #[test]
    fn test_bullet_explodes_at_target() {
        let assets = loaded_assets();
        let (mut world, time) = arena_world(&assets);
        let target = DVec2::new(115.0, 10.0);
        world.add_entity(Actor::Bullet(Bullet::new(&assets, DVec2::new(85.0, 0.0), 0.0, target)));

        for _ in 0..3 {
            step(&mut world, &time, 0.05);
            assert!(matches!(world.entities()[0], Actor::Bullet(_)));
        }
        step(&mut world, &time, 0.05);
        assert_eq!(world.entities().len(), 1);
        let Actor::BulletExplosion(explosion) = &world.entities()[0] else {
            panic!("expected explosion");
        };
        assert_eq!(explosion.body.position, target);
        assert_eq!(sound_keys(&mut world), vec![BULLET_BOOM_SOUND]);
    }

    #[test]
    fn test_bullet_leaving_screen_is_removed() {
        let assets = loaded_assets();
        let (mut world, time) = arena_world(&assets);
        world.add_entity(Actor::Bullet(Bullet::new(
            &assets,
            DVec2::new(401.0, 0.0),
            0.0,
            DVec2::new(1000.0, 1000.0),
        )));
        step(&mut world, &time, 0.016);
        assert!(world.entities().is_empty());
        assert!(world.take_sounds().is_empty());
    }

    #[test]
    fn test_bullet_explosion_destroys_overlapping_aliens() {
        let assets = loaded_assets();
        let (mut world, time) = arena_world(&assets);
        world.add_entity(Actor::BulletExplosion(BulletExplosion::new(&assets, DVec2::new(200.0, 0.0))));
        world.add_entity(Actor::Alien(Alien::new(&assets, 210.0, 0.0)));
        world.add_entity(Actor::Alien(Alien::new(&assets, 200.0, PI)));

        step(&mut world, &time, 0.01);
        assert_eq!(world.shared().score, SCORE_PER_ALIEN);
        assert_eq!(sound_keys(&mut world), vec![ALIEN_BOOM_SOUND]);

        assert_eq!(world.entities().len(), 3);
        assert!(matches!(world.entities()[0], Actor::BulletExplosion(_)));
        assert!(world.entities()[1].is_alien());
        assert!(matches!(&world.entities()[2], Actor::AlienExplosion(e) if e.body.position == DVec2::new(210.0, 0.0)));
    }

    #[test]
    fn test_alien_caught_twice_scores_once() {
        let assets = loaded_assets();
        let (mut world, time) = arena_world(&assets);
        world.add_entity(Actor::BulletExplosion(BulletExplosion::new(&assets, DVec2::new(200.0, 0.0))));
        world.add_entity(Actor::BulletExplosion(BulletExplosion::new(&assets, DVec2::new(205.0, 0.0))));
        world.add_entity(Actor::Alien(Alien::new(&assets, 200.0, 0.0)));

        step(&mut world, &time, 0.01);
        assert_eq!(world.shared().score, SCORE_PER_ALIEN);
        assert_eq!(world.entities().iter().filter(|a| a.is_alien()).count(), 0);
    }

    #[test]
    fn test_bullet_explosion_grows_then_expires() {
        let assets = loaded_assets();
        let (mut world, time) = arena_world(&assets);
        world.add_entity(Actor::BulletExplosion(BulletExplosion::new(&assets, DVec2::ZERO)));

        step(&mut world, &time, 0.03);
        step(&mut world, &time, 0.03);
        assert_eq!(world.entities()[0].radius(), Some(17.0));
        step(&mut world, &time, 0.03);
        let grown = world.entities()[0].radius().unwrap();
        assert!((grown - 17.0 * 4.0 / 3.0).abs() < 1e-9);

        for _ in 0..20 {
            step(&mut world, &time, 0.03);
        }
        assert!(world.entities().is_empty());
    }

    #[test]
    fn test_alien_explosion_expires() {
        let assets = loaded_assets();
        let (mut world, time) = arena_world(&assets);
        world.add_entity(Actor::AlienExplosion(AlienExplosion::new(&assets, DVec2::ZERO)));
        // 10 frames of 0.05s
        for _ in 0..10 {
            step(&mut world, &time, 0.049);
        }
        assert_eq!(world.entities().len(), 1);
        for _ in 0..2 {
            step(&mut world, &time, 0.05);
        }
        assert!(world.entities().is_empty());
    }
}
