use maze_shared::config::GameConfig;
use maze_shared::protocol::{round2, BallColor, BallWire};

/// One connected player's ball. Mutated every simulation step while the
/// session is running.
#[derive(Debug, Clone)]
pub struct Ball {
    /// Connection id of the owning player.
    pub owner: u32,
    pub user_name: String,
    pub color: BallColor,
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
    pub radius: f64,
}

impl Ball {
    pub fn to_wire(&self) -> BallWire {
        BallWire {
            id: self.owner,
            user_name: self.user_name.clone(),
            color: self.color,
            x: round2(self.x),
            y: round2(self.y),
            radius: self.radius,
            dx: round2(self.dx),
            dy: round2(self.dy),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinError {
    SessionFull,
}

/// Authoritative set of active balls, in join order. Join order is the
/// physics iteration order, so it must stay stable across steps.
#[derive(Debug)]
pub struct BallRegistry {
    balls: Vec<Ball>,
    max_players: usize,
}

impl BallRegistry {
    pub fn new(max_players: usize) -> Self {
        Self {
            balls: Vec::new(),
            max_players,
        }
    }

    /// First palette color without an active ball, in palette order.
    pub fn assign_color(&self) -> Option<BallColor> {
        BallColor::PALETTE
            .into_iter()
            .find(|color| !self.balls.iter().any(|b| b.color == *color))
    }

    /// Add a ball for `owner` at its color's spawn point. A repeated
    /// join from the same connection returns the existing ball.
    pub fn join(
        &mut self,
        owner: u32,
        user_name: &str,
        config: &GameConfig,
    ) -> Result<&Ball, JoinError> {
        if let Some(idx) = self.balls.iter().position(|b| b.owner == owner) {
            return Ok(&self.balls[idx]);
        }
        if self.balls.len() >= self.max_players {
            return Err(JoinError::SessionFull);
        }
        let color = self.assign_color().ok_or(JoinError::SessionFull)?;
        let (x, y) = spawn_point(color, config);
        self.balls.push(Ball {
            owner,
            user_name: user_name.to_string(),
            color,
            x,
            y,
            dx: 0.0,
            dy: 0.0,
            radius: config.ball_radius,
        });
        Ok(self.balls.last().expect("just pushed"))
    }

    /// Remove the ball owned by `owner`, freeing its color.
    pub fn leave(&mut self, owner: u32) -> Option<Ball> {
        let idx = self.balls.iter().position(|b| b.owner == owner)?;
        Some(self.balls.remove(idx))
    }

    pub fn get(&self, owner: u32) -> Option<&Ball> {
        self.balls.iter().find(|b| b.owner == owner)
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    /// Commit the ball states produced by a physics step. The snapshot
    /// must preserve join order.
    pub fn commit(&mut self, balls: Vec<Ball>) {
        debug_assert_eq!(balls.len(), self.balls.len());
        self.balls = balls;
    }

    pub fn len(&self) -> usize {
        self.balls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    pub fn clear(&mut self) {
        self.balls.clear();
    }

    pub fn to_wire(&self) -> Vec<BallWire> {
        self.balls.iter().map(Ball::to_wire).collect()
    }
}

/// Fixed spawn corners, one per palette color.
fn spawn_point(color: BallColor, config: &GameConfig) -> (f64, f64) {
    let near = 2.0 * config.ball_radius;
    let far = config.arena_size - 2.0 * config.ball_radius;
    match color {
        BallColor::Blue => (near, near),
        BallColor::Red => (far, near),
        BallColor::Purple => (near, far),
        BallColor::Green => (config.arena_size / 2.0, near),
    }
}
