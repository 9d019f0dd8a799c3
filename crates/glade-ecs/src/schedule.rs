use glade_core::{Profiler, ScopeTimer};
use tracing::debug;

use crate::world::World;

/// Which stage of the frame a system runs in. Ordering matters: all
/// FixedUpdate systems run before Update systems, which run before Render
/// systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// Once per fixed simulation step; may run zero or more times per frame.
    FixedUpdate,
    /// Once per rendered frame, variable dt.
    Update,
    /// Once per rendered frame; receives the interpolation alpha, and by
    /// convention reads derived state only.
    Render,
}

/// A system callback. The float is the fixed/variable dt for simulation
/// phases and the interpolation alpha for Render.
pub trait System: Send + Sync {
    fn run(&mut self, world: &mut World, dt: f32);
}

/// Blanket implementation so closures and fns can be used as systems.
impl<F: FnMut(&mut World, f32) + Send + Sync> System for F {
    fn run(&mut self, world: &mut World, dt: f32) {
        (self)(world, dt);
    }
}

struct SystemRecord {
    name: String,
    phase: Phase,
    priority: i32,
    enabled: bool,
    system: Box<dyn System>,
}

/// Ordered list of named, phased, prioritized systems.
///
/// The list is re-sorted by `(phase, priority, name)` on every registration,
/// so execution order is total and reproducible no matter the registration
/// sequence. Each invocation is timed and reported to the owned
/// [`Profiler`].
pub struct Schedule {
    systems: Vec<SystemRecord>,
    profiler: Profiler,
}

impl Schedule {
    pub fn new() -> Self {
        Self::with_profiler(Profiler::default())
    }

    pub fn with_profiler(profiler: Profiler) -> Self {
        Self {
            systems: Vec::new(),
            profiler,
        }
    }

    /// Register a system. Lower priority runs earlier within its phase; name
    /// is the deterministic tiebreak when priorities collide.
    pub fn add_system<S: System + 'static>(
        &mut self,
        name: impl Into<String>,
        phase: Phase,
        priority: i32,
        system: S,
    ) {
        let name = name.into();
        debug!(name = %name, ?phase, priority, "registering system");
        self.systems.push(SystemRecord {
            name,
            phase,
            priority,
            enabled: true,
            system: Box::new(system),
        });
        self.sort_systems();
    }

    fn sort_systems(&mut self) {
        // Registration happens at setup time, so a full re-sort per add is
        // fine. Vec::sort_by is stable.
        self.systems
            .sort_by(|a, b| (a.phase, a.priority, &a.name).cmp(&(b.phase, b.priority, &b.name)));
    }

    fn run_phase(&mut self, phase: Phase, world: &mut World, dt_or_alpha: f32) {
        for record in &mut self.systems {
            if record.phase != phase || !record.enabled {
                continue;
            }
            let timer = ScopeTimer::new(&mut self.profiler, record.name.as_str());
            record.system.run(world, dt_or_alpha);
            timer.finish();
        }
    }

    /// Run all enabled FixedUpdate systems once, in sorted order.
    pub fn fixed_update(&mut self, world: &mut World, fixed_dt: f32) {
        self.run_phase(Phase::FixedUpdate, world, fixed_dt);
    }

    /// Run all enabled Update systems once, in sorted order.
    pub fn update(&mut self, world: &mut World, dt: f32) {
        self.run_phase(Phase::Update, world, dt);
    }

    /// Run all enabled Render systems once, in sorted order.
    pub fn render(&mut self, world: &mut World, alpha: f32) {
        self.run_phase(Phase::Render, world, alpha);
    }

    /// Enable or disable a system by name. A disabled system keeps its slot
    /// in the sorted list (no re-sort needed) but is skipped entirely: no
    /// callback, no timing sample. Returns `false` if the name is unknown.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        for record in &mut self.systems {
            if record.name == name {
                debug!(name, enabled, "toggling system");
                record.enabled = enabled;
                return true;
            }
        }
        false
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.systems
            .iter()
            .any(|record| record.name == name && record.enabled)
    }

    /// Registered system names in execution order.
    pub fn system_names(&self) -> impl Iterator<Item = &str> {
        self.systems.iter().map(|record| record.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    pub fn profiler(&self) -> &Profiler {
        &self.profiler
    }

    pub fn profiler_mut(&mut self) -> &mut Profiler {
        &mut self.profiler
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new()
    }
}
