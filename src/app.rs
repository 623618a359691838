use std::path::PathBuf;
use std::time::Duration;

use glam::Vec2;
use instant::Instant;
use serde::Serialize;

use petengine::coordinator::{Coordinator, DisplayId};
use petengine::ecs::capabilities::{mouse_chaser, wall_walker};
use petengine::input::InputEvent;
use petengine::species::SpeciesTable;
use petengine::{pet, PetError, PetSnapshot, Rect, Settings};

/// Target simulation tick rate (seconds per tick).
const TICK_RATE: f64 = 1.0 / 60.0;
/// Max accumulated time before we clamp (prevents spiral of death).
const MAX_ACCUMULATOR: f64 = 0.25;
/// How often to log FPS (seconds).
const FPS_LOG_INTERVAL: f64 = 5.0;
/// The headless runner simulates a single display.
const DISPLAY: DisplayId = 0;
/// Radius of the pointer's orbit around the display center.
const POINTER_ORBIT: f32 = 150.0;

/// Everything `run` needs from the command line.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub pets: usize,
    pub seconds: f64,
    pub width: f32,
    pub height: f32,
    pub seed: Option<u64>,
    pub config: Option<PathBuf>,
    pub species_file: Option<PathBuf>,
    pub species: Vec<String>,
    pub wall_walking: bool,
    pub chase: bool,
    pub realtime: bool,
}

// ---------------------------------------------------------------------------
// Frame timing
// ---------------------------------------------------------------------------

struct FrameStats {
    frame_count: u64,
    last_log_time: Instant,
    frame_time_sum: f64,
    frame_time_min: f64,
    frame_time_max: f64,
    frames_since_log: u32,
}

impl FrameStats {
    fn new() -> Self {
        Self {
            frame_count: 0,
            last_log_time: Instant::now(),
            frame_time_sum: 0.0,
            frame_time_min: f64::MAX,
            frame_time_max: 0.0,
            frames_since_log: 0,
        }
    }

    fn record_frame(&mut self, dt: f64) {
        self.frame_count += 1;
        self.frames_since_log += 1;
        self.frame_time_sum += dt;
        self.frame_time_min = self.frame_time_min.min(dt);
        self.frame_time_max = self.frame_time_max.max(dt);

        let elapsed = self.last_log_time.elapsed().as_secs_f64();
        if elapsed >= FPS_LOG_INTERVAL {
            let avg_ms = (self.frame_time_sum / self.frames_since_log as f64) * 1000.0;
            let fps = self.frames_since_log as f64 / elapsed;
            log::info!(
                "FPS: {:.0} | avg: {:.2}ms | min: {:.2}ms | max: {:.2}ms | total frames: {}",
                fps,
                avg_ms,
                self.frame_time_min * 1000.0,
                self.frame_time_max * 1000.0,
                self.frame_count,
            );
            self.last_log_time = Instant::now();
            self.frame_time_sum = 0.0;
            self.frame_time_min = f64::MAX;
            self.frame_time_max = 0.0;
            self.frames_since_log = 0;
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Final per-pet state, printed as JSON when the run ends.
#[derive(Debug, Serialize)]
struct PetReport {
    id: String,
    species: String,
    state: String,
    animation: String,
    x: f32,
    y: f32,
    size: f32,
    rotation: f32,
    flip_h: bool,
}

impl PetReport {
    /// Position interpolated between the last two ticks.
    fn from_snapshot(s: &PetSnapshot, alpha: f32) -> Self {
        let pos = s.prev_frame.origin.lerp(s.frame.origin, alpha);
        Self {
            id: s.id.clone(),
            species: s.species_id.clone(),
            state: s.state.clone(),
            animation: s.animation.clone(),
            x: pos.x,
            y: pos.y,
            size: s.frame.width(),
            rotation: s.rotation,
            flip_h: s.flip_h,
        }
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

struct App {
    coordinator: Coordinator,
    bounds: Rect,
    chase: bool,

    // Fixed timestep
    accumulator: f64,
    tick_count: u64,

    frame_stats: FrameStats,
}

impl App {
    fn new(opts: &RunOptions) -> petengine::Result<Self> {
        let settings = match &opts.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        let species = match &opts.species_file {
            Some(path) => SpeciesTable::load(path)?,
            None => SpeciesTable::builtin(),
        };
        let seed = opts.seed.unwrap_or_else(|| fastrand::u64(..));
        log::info!("Seed {seed}");

        let bounds = Rect::new(0.0, 0.0, opts.width, opts.height);
        let mut coordinator = Coordinator::new(settings, species, seed);
        coordinator.add_display(DISPLAY, bounds);

        Ok(Self {
            coordinator,
            bounds,
            chase: opts.chase,
            accumulator: 0.0,
            tick_count: 0,
            frame_stats: FrameStats::new(),
        })
    }

    /// Spawn pets round-robin over the requested species and apply the
    /// mode toggles.
    fn spawn_pets(&mut self, opts: &RunOptions) -> petengine::Result<()> {
        let species: Vec<String> = if opts.species.is_empty() {
            vec!["cat".to_string()]
        } else {
            opts.species.clone()
        };
        let world = self
            .coordinator
            .world_mut(DISPLAY)
            .ok_or(PetError::UnknownDisplay(DISPLAY))?;

        let mut spawned = Vec::with_capacity(opts.pets);
        for (i, id) in species.iter().enumerate() {
            let share = opts.pets / species.len() + usize::from(i < opts.pets % species.len());
            spawned.extend(pet::spawn_scattered(world, id, share)?);
        }
        for &p in &spawned {
            if opts.wall_walking {
                wall_walker::enable(world, p, true);
            } else if opts.chase {
                mouse_chaser::enable(world, p);
            }
        }
        log::info!("Spawned {} pets", spawned.len());
        Ok(())
    }

    /// Pointer position at simulation time `t`: a slow circle around the
    /// display center.
    fn pointer_at(&self, t: f64) -> Vec2 {
        let angle = (t * 0.5) as f32;
        self.bounds.center() + Vec2::new(angle.cos(), angle.sin()) * POINTER_ORBIT
    }

    /// Run fixed-timestep simulation ticks.
    fn run_fixed_update(&mut self, dt: f64, max_ticks: u64) {
        self.accumulator += dt;

        if self.accumulator > MAX_ACCUMULATOR {
            self.accumulator = MAX_ACCUMULATOR;
        }

        while self.accumulator >= TICK_RATE && self.tick_count < max_ticks {
            if self.chase {
                let pointer = self.pointer_at(self.tick_count as f64 * TICK_RATE);
                if let Some(world) = self.coordinator.world_mut(DISPLAY) {
                    world.handle_input(InputEvent::PointerMoved(pointer));
                }
            }
            self.coordinator.tick_all(TICK_RATE as f32);

            self.accumulator -= TICK_RATE;
            self.tick_count += 1;
        }
    }

    /// Interpolation alpha for rendering between ticks.
    fn interpolation_alpha(&self) -> f32 {
        (self.accumulator / TICK_RATE) as f32
    }

    fn build_report(&self) -> Vec<PetReport> {
        let alpha = self.interpolation_alpha();
        self.coordinator
            .snapshots(DISPLAY)
            .iter()
            .map(|s| PetReport::from_snapshot(s, alpha))
            .collect()
    }
}

/// Entry point: build the world, simulate, print the final state.
pub fn run(opts: &RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new(opts)?;
    app.spawn_pets(opts)?;

    let max_ticks = (opts.seconds.max(0.0) / TICK_RATE).round() as u64;
    log::info!("Simulating {:.1}s ({max_ticks} ticks)", opts.seconds);

    if opts.realtime {
        let mut last = Instant::now();
        while app.tick_count < max_ticks {
            let now = Instant::now();
            let dt = now.duration_since(last).as_secs_f64();
            last = now;
            app.frame_stats.record_frame(dt);
            app.run_fixed_update(dt, max_ticks);
            std::thread::sleep(Duration::from_millis(1));
        }
    } else {
        while app.tick_count < max_ticks {
            let start = Instant::now();
            app.run_fixed_update(TICK_RATE, max_ticks);
            app.frame_stats.record_frame(start.elapsed().as_secs_f64());
        }
    }

    let report = app.build_report();
    println!("{}", serde_json::to_string_pretty(&report)?);
    log::info!("Done after {} ticks", app.tick_count);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> RunOptions {
        RunOptions {
            pets: 5,
            seconds: 2.0,
            width: 640.0,
            height: 480.0,
            seed: Some(3),
            config: None,
            species_file: None,
            species: vec!["cat".into(), "ape".into()],
            wall_walking: false,
            chase: false,
            realtime: false,
        }
    }

    #[test]
    fn spawns_round_robin() {
        let opts = options();
        let mut app = App::new(&opts).unwrap();
        app.spawn_pets(&opts).unwrap();
        let report = app.build_report();
        assert_eq!(report.len(), 5);
        assert_eq!(report.iter().filter(|r| r.species == "cat").count(), 3);
    }

    #[test]
    fn fixed_update_is_capped() {
        let opts = options();
        let mut app = App::new(&opts).unwrap();
        app.spawn_pets(&opts).unwrap();
        app.run_fixed_update(10.0, u64::MAX);
        // Clamped to MAX_ACCUMULATOR worth of ticks (15, give or take
        // float rounding on the last one).
        assert!((14..=15).contains(&app.tick_count), "{} ticks", app.tick_count);
    }

    #[test]
    fn unknown_species_fails() {
        let mut opts = options();
        opts.species = vec!["unicorn".into()];
        let mut app = App::new(&opts).unwrap();
        assert!(app.spawn_pets(&opts).is_err());
    }
}
