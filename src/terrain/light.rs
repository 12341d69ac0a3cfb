use glam::Vec3;

/// Point light orbiting the origin in the XY plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightState {
    /// Angle in degrees.
    pub theta: f32,
    pub radius: f32,
}

impl Default for LightState {
    fn default() -> Self {
        Self {
            theta: 45.0,
            radius: 3.0,
        }
    }
}

impl LightState {
    /// World-space light position. The z component is always 0.
    pub fn position(&self) -> Vec3 {
        let (sin, cos) = self.theta.to_radians().sin_cos();
        Vec3::new(self.radius * cos, self.radius * sin, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position() {
        let light = LightState {
            theta: 90.0,
            radius: 2.0,
        };
        let p = light.position();
        assert!(p.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-5), "{:?}", p);

        let p = LightState::default().position();
        assert!((p.x - p.y).abs() < 1e-5);
        assert!((p.length() - 3.0).abs() < 1e-5);
        assert_eq!(p.z, 0.0);
    }
}
