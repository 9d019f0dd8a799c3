use glam::Vec2;

/// 2D position with the previous fixed-step position kept for render
/// interpolation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    pub position: Vec2,
    pub prev_position: Vec2,
    pub rotation: f32,
}

impl Transform2D {
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            prev_position: position,
            rotation: 0.0,
        }
    }

    /// Position blended between the previous and current fixed step.
    pub fn interpolated(&self, alpha: f32) -> Vec2 {
        self.prev_position.lerp(self.position, alpha)
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::from_position(Vec2::ZERO)
    }
}

/// Linear velocity in world units per second.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity2D {
    pub velocity: Vec2,
}

impl Velocity2D {
    pub fn new(velocity: Vec2) -> Self {
        Self { velocity }
    }
}

/// Axis-aligned box collider. The box is centered at the entity's position
/// plus the offset; only solid colliders take part in collision resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxCollider {
    pub width: f32,
    pub height: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub is_solid: bool,
}

impl BoxCollider {
    /// A solid box centered on the entity.
    pub fn solid(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            offset_x: 0.0,
            offset_y: 0.0,
            is_solid: true,
        }
    }

    /// A non-solid box, useful for trigger volumes.
    pub fn sensor(width: f32, height: f32) -> Self {
        Self {
            is_solid: false,
            ..Self::solid(width, height)
        }
    }

    pub fn with_offset(mut self, offset_x: f32, offset_y: f32) -> Self {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolated_blends_positions() {
        let mut transform = Transform2D::from_position(Vec2::ZERO);
        transform.prev_position = Vec2::new(0.0, 0.0);
        transform.position = Vec2::new(2.0, 4.0);
        assert_eq!(transform.interpolated(0.5), Vec2::new(1.0, 2.0));
        assert_eq!(transform.interpolated(0.0), Vec2::ZERO);
        assert_eq!(transform.interpolated(1.0), Vec2::new(2.0, 4.0));
    }

    #[test]
    fn collider_builders() {
        let collider = BoxCollider::solid(2.0, 1.0).with_offset(0.5, -0.5);
        assert!(collider.is_solid);
        assert_eq!(collider.offset_x, 0.5);
        assert!(!BoxCollider::sensor(1.0, 1.0).is_solid);
    }
}
