//! Lizard Drop headless demo
//!
//! Drives a `Playground` over the in-memory physics world with scripted taps,
//! rain and tilt, logging what the pool does.
//!
//! Usage: `lizard-drop [settings.json] [orientation]`. The orientation
//! (e.g. `landscapeRight`, `portrait-upside-down`) is the interface rotation
//! used for the second half of the run; it defaults to `landscapeLeft`.

use glam::Vec2;

use lizard_drop::Settings;
use lizard_drop::playground::Playground;
use lizard_drop::sim::{
    GravitySample, Orientation, PhysicsWorld, PoolEvent, RemovalReason, SimpleWorld,
};

const SCENE: Vec2 = Vec2::new(390.0, 844.0);
const FRAME_DT: f32 = 1.0 / 60.0;

fn main() {
    env_logger::init();
    log::info!("Lizard Drop (headless) starting...");

    let json = std::env::args()
        .nth(1)
        .and_then(|path| match std::fs::read_to_string(&path) {
            Ok(json) => Some(json),
            Err(e) => {
                log::warn!("Could not read {}: {}", path, e);
                None
            }
        });
    let rotated = std::env::args()
        .nth(2)
        .map(|s| Orientation::parse(&s))
        .unwrap_or(Orientation::LandscapeLeft);
    if rotated == Orientation::Unknown {
        log::warn!("Unrecognized orientation, tilt falls back to portrait mapping");
    }
    let mut settings = Settings::load_or_default(json.as_deref());
    settings.rain_enabled = true;

    let seed = 0x11ad;
    let mut playground = Playground::new(SimpleWorld::new(SCENE), settings, seed);
    playground.set_scene_size(SCENE);
    log::info!("Playground initialized with seed: {}", seed);

    let mut expired = 0;
    let mut evicted = 0;
    let motion_every = (playground.settings().motion_interval_secs / FRAME_DT).round().max(1.0) as u32;

    for frame in 0..60 * 30u32 {
        let t = frame as f32 * FRAME_DT;

        // Scripted input
        match frame {
            60 => {
                playground.press(Vec2::new(SCENE.x * 0.5, SCENE.y * 0.7));
            }
            240 => playground.release(),
            _ if frame % 45 == 0 => {
                playground.tap(Vec2::new(t * 37.0 % SCENE.x, SCENE.y * 0.6));
            }
            _ => {}
        }

        // Slow tilt sweep, rotating the interface halfway through
        if frame % motion_every == 0 {
            let orientation = if t < 15.0 {
                Orientation::Portrait
            } else {
                rotated
            };
            let angle = (t * 0.4).sin() * 0.6;
            let sample = GravitySample::new(angle.sin(), -angle.cos(), 0.0);
            playground.motion_update(sample, orientation);
        }

        // A stretch of slow frames between 20s and 22s
        let dt = if (20.0..22.0).contains(&t) { 1.0 / 25.0 } else { FRAME_DT };

        for event in playground.frame(dt) {
            if let PoolEvent::Removed { reason, .. } = event {
                match reason {
                    RemovalReason::Expired => expired += 1,
                    RemovalReason::Capacity | RemovalReason::LowFps => evicted += 1,
                }
            }
        }
        playground.world_mut().step(dt);

        if frame % 300 == 0 {
            log::info!(
                "t={:>5.1}s live={:>3} fps={:>5.1} gravity={:?}",
                t,
                playground.count(),
                playground.fps(),
                playground.world().gravity()
            );
        }
    }

    log::info!(
        "Done: {} spawned, {} expired, {} evicted, {} live",
        playground.total_spawned(),
        expired,
        evicted,
        playground.count()
    );

    playground.clear_all();
}
