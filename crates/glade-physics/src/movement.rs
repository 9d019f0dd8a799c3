use glade_ecs::World;

use crate::components::{Transform2D, Velocity2D};

/// Integrates velocity into position for one fixed step. Saves the previous
/// position first so Render-phase consumers can interpolate between steps.
///
/// Runs in FixedUpdate, before the collision system.
pub fn movement_system(world: &mut World, dt: f32) {
    for (_, (transform, velocity)) in world.query::<(&mut Transform2D, &Velocity2D)>() {
        transform.prev_position = transform.position;
        transform.position += velocity.velocity * dt;
    }
}
