//! Unattended play: aim at the closest alien and fire on a cooldown

use glam::DVec2;

use super::session::EvilAliens;
use crate::consts::{ALIEN_SPEED, BULLET_SPEED, BULLET_START_DISTANCE};
use crate::engine::Entity;

/// Frames between shots
pub const SHOT_COOLDOWN: u32 = 30;

/// Where the closest alien will be when a bullet fired now gets there.
///
/// Bullets leave the sentry at `BULLET_START_DISTANCE` and fly outward while
/// the alien closes in, so the aim point is pulled toward the planet.
pub fn lead_target(aliens: impl IntoIterator<Item = DVec2>) -> Option<DVec2> {
    let closest = aliens
        .into_iter()
        .min_by(|a, b| a.length_squared().total_cmp(&b.length_squared()))?;

    let distance = closest.length();
    if distance <= 0.0 {
        return None;
    }
    let flight = (distance - BULLET_START_DISTANCE).max(0.0) / BULLET_SPEED;
    Some(closest * ((distance - ALIEN_SPEED * flight).max(0.0) / distance))
}

#[derive(Debug, Default)]
pub struct Autopilot {
    cooldown: u32,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the sentry for the coming frame. Returns true if it fired.
    pub fn steer(&mut self, session: &mut EvilAliens) -> bool {
        self.cooldown = self.cooldown.saturating_sub(1);
        let aliens = session
            .world()
            .entities()
            .iter()
            .filter(|a| a.is_alien())
            .map(|a| a.position());
        let Some(target) = lead_target(aliens) else {
            return false;
        };

        session.record_move(target);
        if self.cooldown > 0 {
            return false;
        }
        session.record_click(target);
        self.cooldown = SHOT_COOLDOWN;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;
    use crate::engine::{AssetLoader, Clock};
    use crate::game::manifest::{BULLET_SOUND, headless_source, queue_all};
    use crate::platform::ManualTime;
    use crate::renderer::RecordingSurface;

    #[test]
    fn test_lead_target_aims_short_of_the_closest_alien() {
        let target = lead_target([DVec2::new(0.0, -600.0), DVec2::new(400.0, 0.0)]).unwrap();
        // 305px of bullet flight at 250px/s, the alien covers 122px meanwhile
        assert!((target - DVec2::new(278.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn test_lead_target_inside_muzzle_distance_aims_directly() {
        let alien = DVec2::new(30.0, 40.0);
        assert_eq!(lead_target([alien]), Some(alien));
    }

    #[test]
    fn test_lead_target_needs_an_alien_off_center() {
        assert_eq!(lead_target(Vec::<DVec2>::new()), None);
        assert_eq!(lead_target([DVec2::ZERO]), None);
    }

    #[test]
    fn test_steer_fires_then_waits_for_cooldown() {
        let loader = AssetLoader::new();
        queue_all(&loader).unwrap();
        loader.load_all(&headless_source(), || {}).unwrap();
        let time = ManualTime::new(0.0);
        let clock = Clock::new(Box::new(time.clone()), 0.05);
        let mut game = EvilAliens::new(clock, &loader, &Settings::default(), 3).unwrap();
        game.init(800.0, 600.0).unwrap();
        game.start().unwrap();
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let mut pilot = Autopilot::new();

        // Nothing to aim at before the first alien
        assert!(!pilot.steer(&mut game));

        time.advance(0.016);
        game.frame(&mut surface).unwrap();
        assert!(pilot.steer(&mut game));
        time.advance(0.016);
        let sounds = game.frame(&mut surface).unwrap();
        assert!(sounds.iter().any(|s| s.key() == BULLET_SOUND));

        for _ in 1..SHOT_COOLDOWN {
            assert!(!pilot.steer(&mut game));
            time.advance(0.016);
            game.frame(&mut surface).unwrap();
        }
        assert!(pilot.steer(&mut game));
    }
}
