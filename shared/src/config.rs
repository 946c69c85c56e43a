/// Game tuning shared by server and client.
///
/// The arena is a square of `arena_size` units divided into square cells
/// of `cell_size` units, giving a `cols() x rows()` maze grid.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export, export_to = "../../client/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    pub arena_size: f64,
    pub cell_size: f64,
    pub ball_radius: f64,
    /// Velocity multiplier applied every step, emulating friction.
    pub damping: f64,
    pub hole_x: f64,
    pub hole_y: f64,
    pub hole_radius: f64,
    /// Shrinks the effective capture zone of the hole.
    pub win_fudge: f64,
    pub max_players: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arena_size: 300.0,
            cell_size: 20.0,
            ball_radius: 5.0,
            damping: 0.5,
            hole_x: 290.0,
            hole_y: 290.0,
            hole_radius: 7.0,
            win_fudge: 5.0,
            max_players: 4,
        }
    }
}

impl GameConfig {
    pub fn cols(&self) -> usize {
        (self.arena_size / self.cell_size).floor() as usize
    }

    pub fn rows(&self) -> usize {
        (self.arena_size / self.cell_size).floor() as usize
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.arena_size.is_finite() || self.arena_size <= 0.0 {
            return Err("arena_size must be finite and > 0".to_string());
        }
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err("cell_size must be finite and > 0".to_string());
        }
        if self.cell_size > self.arena_size {
            return Err("cell_size must not exceed arena_size".to_string());
        }
        if self.cols() < 2 || self.rows() < 2 {
            return Err("grid must be at least 2x2".to_string());
        }
        if !self.ball_radius.is_finite() || self.ball_radius <= 0.0 {
            return Err("ball_radius must be finite and > 0".to_string());
        }
        if self.ball_radius * 2.0 >= self.cell_size {
            return Err("ball diameter must fit inside a cell".to_string());
        }
        if !self.damping.is_finite() || self.damping <= 0.0 || self.damping > 1.0 {
            return Err("damping must be in (0, 1]".to_string());
        }
        if !self.hole_radius.is_finite() || self.hole_radius <= 0.0 {
            return Err("hole_radius must be finite and > 0".to_string());
        }
        if self.max_players == 0 {
            return Err("max_players must be > 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_grid_is_15_by_15() {
        let config = GameConfig::default();
        assert_eq!(config.cols(), 15);
        assert_eq!(config.rows(), 15);
    }

    #[test]
    fn zero_cell_size_invalid() {
        let mut config = GameConfig::default();
        config.cell_size = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_ball_invalid() {
        let mut config = GameConfig::default();
        config.ball_radius = 12.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn tiny_arena_invalid() {
        let mut config = GameConfig::default();
        config.arena_size = 30.0;
        assert!(config.validate().is_err());
    }
}
