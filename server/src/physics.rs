//! The authoritative per-step physics: integration under the fused tilt
//! vector, arena clamping, maze-wall reflection and pairwise ball
//! collisions.

use crate::grid::Grid;
use crate::registry::Ball;
use maze_shared::config::GameConfig;

/// Global steering applied to every ball in a step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TiltVector {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub balls: Vec<Ball>,
    /// Owners of balls that ended the step inside the hole's capture
    /// zone, in registry order.
    pub winners: Vec<u32>,
}

/// Advance every ball by one step. Pure over the input snapshot; the
/// caller commits the returned states.
///
/// Balls are processed in registry order. The pairwise collision pass
/// mutates later balls in place, so a ball can be displaced more than
/// once per step; the pass is not iterated to convergence.
pub fn step(tilt: TiltVector, grid: &Grid, snapshot: &[Ball], config: &GameConfig) -> StepOutcome {
    let mut balls = snapshot.to_vec();

    for idx in 0..balls.len() {
        let mut ball = balls[idx].clone();

        // Integrate velocity under the shared tilt, with damping.
        ball.dx += tilt.x;
        ball.dy += tilt.y;
        ball.dx *= config.damping;
        ball.dy *= config.damping;

        let mut next_x = ball.x + ball.dx;
        let mut next_y = ball.y + ball.dy;

        // Keep the ball inside the arena on each axis independently.
        next_x = next_x.clamp(ball.radius, config.arena_size - ball.radius);
        next_y = next_y.clamp(ball.radius, config.arena_size - ball.radius);

        // Wall collisions against the occupied cell. Each direction is
        // checked on its own and only when the ball moves toward it, so
        // an X and a Y bounce can resolve in the same step.
        let col = (next_x / config.cell_size).floor() as isize;
        let row = (next_y / config.cell_size).floor() as isize;
        if col >= 0 && row >= 0 {
            if let Some(cell) = grid.cell(col as usize, row as usize) {
                let cell_left = col as f64 * config.cell_size;
                let cell_right = cell_left + config.cell_size;
                let cell_top = row as f64 * config.cell_size;
                let cell_bottom = cell_top + config.cell_size;

                if ball.dy < 0.0 && cell.walls.top && next_y - ball.radius < cell_top {
                    next_y = cell_top + ball.radius;
                    ball.dy = -ball.dy;
                }
                if ball.dy > 0.0 && cell.walls.bottom && next_y + ball.radius > cell_bottom {
                    next_y = cell_bottom - ball.radius;
                    ball.dy = -ball.dy;
                }
                if ball.dx < 0.0 && cell.walls.left && next_x - ball.radius < cell_left {
                    next_x = cell_left + ball.radius;
                    ball.dx = -ball.dx;
                }
                if ball.dx > 0.0 && cell.walls.right && next_x + ball.radius > cell_right {
                    next_x = cell_right - ball.radius;
                    ball.dx = -ball.dx;
                }
            }
        }

        // All-pairs ball collision: separate by half the overlap each
        // and swap full velocity vectors (equal-mass elastic).
        for j in 0..balls.len() {
            if j == idx {
                continue;
            }
            let dx = balls[j].x - next_x;
            let dy = balls[j].y - next_y;
            let distance = (dx * dx + dy * dy).sqrt();
            if distance < ball.radius + balls[j].radius {
                let angle = dy.atan2(dx);
                let (sin, cos) = angle.sin_cos();
                let overlap = 0.5 * (ball.radius + balls[j].radius - distance);
                next_x -= overlap * cos;
                next_y -= overlap * sin;
                balls[j].x += overlap * cos;
                balls[j].y += overlap * sin;
                std::mem::swap(&mut ball.dx, &mut balls[j].dx);
                std::mem::swap(&mut ball.dy, &mut balls[j].dy);
            }
        }

        ball.x = next_x;
        ball.y = next_y;
        balls[idx] = ball;
    }

    // A pairwise push can shove an already-committed ball past the
    // arena edge; re-clamp so every ball ends the step inside.
    for ball in &mut balls {
        ball.x = ball.x.clamp(ball.radius, config.arena_size - ball.radius);
        ball.y = ball.y.clamp(ball.radius, config.arena_size - ball.radius);
    }

    let winners = balls
        .iter()
        .filter(|ball| in_hole(ball, config))
        .map(|ball| ball.owner)
        .collect();

    StepOutcome { balls, winners }
}

/// Strictly inside the hole's capture zone. The fudge term shrinks the
/// effective capture radius so grazing passes don't count.
pub fn in_hole(ball: &Ball, config: &GameConfig) -> bool {
    let dx = ball.x - config.hole_x;
    let dy = ball.y - config.hole_y;
    let distance = (dx * dx + dy * dy).sqrt();
    distance < config.hole_radius + ball.radius - config.win_fudge
}
