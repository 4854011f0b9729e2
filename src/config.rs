use crate::error::ConfigError;

/// Side length of every texture in the bank. Must stay a power of two.
pub const TEXTURE_SIZE: usize = 64;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,
    /// Horizontal field of view, radians
    pub field_of_view: f32,
    /// Nothing at or beyond this distance is drawn
    pub black_distance: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 200,
            field_of_view: 80f32.to_radians(),
            black_distance: 4.5,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroDimension {
                width: self.width,
                height: self.height,
            });
        }
        check_field_of_view(self.field_of_view)?;
        check_black_distance(self.black_distance)
    }
}

pub(crate) fn check_field_of_view(fov: f32) -> Result<(), ConfigError> {
    if fov.is_finite() && fov > 0.0 && fov < std::f32::consts::PI {
        Ok(())
    } else {
        Err(ConfigError::FieldOfView(fov))
    }
}

pub(crate) fn check_black_distance(distance: f32) -> Result<(), ConfigError> {
    if distance.is_finite() && distance > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::BlackDistance(distance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(RenderConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_values() {
        let base = RenderConfig::default();
        assert!(matches!(
            RenderConfig { width: 0, ..base }.validate(),
            Err(ConfigError::ZeroDimension { .. })
        ));
        assert!(matches!(
            RenderConfig {
                field_of_view: 180f32.to_radians(),
                ..base
            }
            .validate(),
            Err(ConfigError::FieldOfView(_))
        ));
        assert!(matches!(
            RenderConfig {
                black_distance: f32::INFINITY,
                ..base
            }
            .validate(),
            Err(ConfigError::BlackDistance(_))
        ));
    }
}
