//! Glade - headless simulation demo
//!
//! Runs the full fixed-step loop without a window: a walled tile arena,
//! a scatter of solid movers bouncing off the walls and each other, and the
//! phase-ordered schedule driving movement, collision, and a render-phase
//! reporter that only reads interpolated state.

mod settings;

use anyhow::{Context, Result};
use glade_core::{GameTime, Vec2};
use glade_ecs::{Phase, Schedule, World};
use glade_physics::{
    collision_system, movement_system, BoxCollider, TileSolidity, Transform2D, Velocity2D,
};
use rand::{Rng, SeedableRng};
use tracing::{info, trace, Level};
use tracing_subscriber::FmtSubscriber;

use settings::SimSettings;

/// Walled arena: every border tile solid, interior open.
fn build_arena(width: i32, height: i32) -> Result<TileSolidity> {
    let mut tiles = TileSolidity::open(Vec2::ZERO, width, height)?;
    for col in 0..width {
        tiles.set_solid(0, col, true);
        tiles.set_solid(height - 1, col, true);
    }
    for row in 0..height {
        tiles.set_solid(row, 0, true);
        tiles.set_solid(row, width - 1, true);
    }
    Ok(tiles)
}

fn spawn_movers(world: &mut World, settings: &settings::WorldSettings) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(settings.seed);
    for _ in 0..settings.entity_count {
        let e = world.spawn();
        let position = Vec2::new(
            rng.gen_range(2.0..settings.width as f32 - 2.0),
            rng.gen_range(2.0..settings.height as f32 - 2.0),
        );
        let velocity = Vec2::new(rng.gen_range(-3.0..3.0), rng.gen_range(-3.0..3.0));
        world.insert(e, Transform2D::from_position(position));
        world.insert(e, Velocity2D::new(velocity));
        world.insert(e, BoxCollider::solid(0.8, 0.8));
    }
}

/// Flips velocity on any mover that drifted outside the arena interior.
/// FixedUpdate, before movement, so behavior is deterministic per step.
fn bounce_system(bounds: Vec2) -> impl FnMut(&mut World, f32) + Send + Sync {
    move |world, _dt| {
        for (_, (transform, velocity)) in world.query::<(&Transform2D, &mut Velocity2D)>() {
            let p = transform.position;
            if (p.x < 1.0 && velocity.velocity.x < 0.0)
                || (p.x > bounds.x - 1.0 && velocity.velocity.x > 0.0)
            {
                velocity.velocity.x = -velocity.velocity.x;
            }
            if (p.y < 1.0 && velocity.velocity.y < 0.0)
                || (p.y > bounds.y - 1.0 && velocity.velocity.y > 0.0)
            {
                velocity.velocity.y = -velocity.velocity.y;
            }
        }
    }
}

/// Render-phase reporter: reads interpolated positions only, mutates nothing.
fn report_system(world: &mut World, alpha: f32) {
    let mut count = 0usize;
    let mut centroid = Vec2::ZERO;
    for (_, (transform,)) in world.query::<(&Transform2D,)>() {
        centroid += transform.interpolated(alpha);
        count += 1;
    }
    if count > 0 {
        centroid /= count as f32;
    }
    trace!(count, ?centroid, alpha, "render snapshot");
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to set subscriber")?;

    let settings = SimSettings::load("glade.toml");
    settings.time.validate().context("invalid [time] settings")?;
    settings.world.validate().context("invalid [world] settings")?;
    info!(?settings.world, ?settings.run, "starting glade headless demo");

    let mut world = World::new();
    let arena = build_arena(settings.world.width, settings.world.height)
        .context("invalid [world] dimensions")?;
    world.insert_resource(arena);
    spawn_movers(&mut world, &settings.world);

    let bounds = Vec2::new(settings.world.width as f32, settings.world.height as f32);
    let mut schedule = Schedule::new();
    schedule.add_system("bounce", Phase::FixedUpdate, 100, bounce_system(bounds));
    schedule.add_system("movement", Phase::FixedUpdate, 200, movement_system);
    schedule.add_system("collision", Phase::FixedUpdate, 300, collision_system);
    schedule.add_system("report", Phase::Render, 100, report_system);

    let mut time = GameTime::new(settings.time.clone());
    for _ in 0..settings.run.frames {
        schedule.profiler_mut().begin_frame();
        time.update(settings.run.frame_delta);
        while time.consume_fixed_step() {
            schedule.fixed_update(&mut world, time.fixed_delta());
        }
        schedule.update(&mut world, time.delta_time);
        schedule.render(&mut world, time.interpolation());
    }

    info!(
        entities = world.entity_count(),
        sim_seconds = time.total_time,
        "demo finished"
    );
    for (name, stats) in schedule.profiler().stats() {
        info!(
            system = name.as_str(),
            avg_ms = stats.avg_ms,
            max_ms = stats.max_ms,
            "profile"
        );
    }
    Ok(())
}
