use crate::fixed::Fixed64;
use serde::{Deserialize, Serialize};

/// Errors from board configuration validation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grid width must be positive")]
    ZeroWidth,
    #[error("grid height must be positive")]
    ZeroHeight,
    #[error("cell size must be positive")]
    NonPositiveCellSize,
}

/// Construction-time board constants: grid dimensions and the world-space
/// size of one cell. The cell size anchors the meshing geometry -- gear
/// centers sit at cell centers, `cell_size` apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    pub width: u32,
    pub height: u32,
    pub cell_size: Fixed64,
}

impl GridConfig {
    pub fn new(width: u32, height: u32, cell_size: Fixed64) -> Self {
        Self {
            width,
            height,
            cell_size,
        }
    }

    /// Check the invariants `width > 0`, `height > 0`, `cell_size > 0`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if self.height == 0 {
            return Err(ConfigError::ZeroHeight);
        }
        if self.cell_size <= Fixed64::ZERO {
            return Err(ConfigError::NonPositiveCellSize);
        }
        Ok(())
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl Default for GridConfig {
    /// 6x6 board with 0.75-unit cells.
    fn default() -> Self {
        Self {
            width: 6,
            height: 6,
            cell_size: Fixed64::from_num(0.75),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(GridConfig::default().validate(), Ok(()));
        assert_eq!(GridConfig::default().cell_count(), 36);
    }

    #[test]
    fn zero_dimensions_rejected() {
        let cell = Fixed64::from_num(1.0);
        assert_eq!(
            GridConfig::new(0, 6, cell).validate(),
            Err(ConfigError::ZeroWidth)
        );
        assert_eq!(
            GridConfig::new(6, 0, cell).validate(),
            Err(ConfigError::ZeroHeight)
        );
    }

    #[test]
    fn non_positive_cell_size_rejected() {
        assert_eq!(
            GridConfig::new(6, 6, Fixed64::ZERO).validate(),
            Err(ConfigError::NonPositiveCellSize)
        );
        assert_eq!(
            GridConfig::new(6, 6, Fixed64::from_num(-0.5)).validate(),
            Err(ConfigError::NonPositiveCellSize)
        );
    }
}
