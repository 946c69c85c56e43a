//! The session state machine. Owns the maze, the ball registry and the
//! tilt table; turns client events into state changes plus a list of
//! messages for the transport layer to deliver. Never touches channels
//! itself, so the whole lifecycle is testable synchronously.

use crate::grid::Grid;
use crate::maze;
use crate::physics;
use crate::registry::BallRegistry;
use crate::tilt::{TiltFusion, TiltSample};
use maze_shared::config::GameConfig;
use maze_shared::protocol::{
    AnnounceWinnerMsg, AssignColorMsg, AssignHostMsg, AssignIdMsg, BallColor, ClientMsg, GridMsg,
    PlotPlayersMsg, ServerMsg, TiltCanvasMsg,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Accepting joins; the maze is visible but physics is inert.
    Lobby,
    /// Physics advances on every accepted tilt event.
    Running,
    /// A winner was announced. Terminal until every player leaves.
    Finished,
}

/// A message the session wants delivered: either to one connection or
/// to everyone. The game loop fans these out; connection tasks filter
/// targeted sends by id.
#[derive(Debug, Clone)]
pub enum Effect {
    Send { to: u32, msg: ServerMsg },
    Broadcast(ServerMsg),
}

pub struct Session {
    config: GameConfig,
    grid: Grid,
    registry: BallRegistry,
    tilt: TiltFusion,
    phase: SessionPhase,
    /// First connection after session start; only it may start the game
    /// or regenerate the maze.
    host: Option<u32>,
    next_conn_id: u32,
    rng: ChaCha8Rng,
    winner: Option<(String, BallColor)>,
}

impl Session {
    pub fn new(config: GameConfig, rng_seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(rng_seed);
        let grid = maze::generate(config.cols(), config.rows(), &mut rng);
        let registry = BallRegistry::new(config.max_players);
        Self {
            config,
            grid,
            registry,
            tilt: TiltFusion::new(),
            phase: SessionPhase::Lobby,
            host: None,
            next_conn_id: 1,
            rng,
            winner: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn host(&self) -> Option<u32> {
        self.host
    }

    pub fn winner(&self) -> Option<&(String, BallColor)> {
        self.winner.as_ref()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn registry(&self) -> &BallRegistry {
        &self.registry
    }

    /// Register a new connection: assign its id, elect it host if the
    /// seat is empty, and send it the current maze.
    pub fn connect(&mut self) -> (u32, Vec<Effect>) {
        let id = self.next_conn_id;
        self.next_conn_id += 1;

        let is_host = self.host.is_none();
        if is_host {
            self.host = Some(id);
        }

        let effects = vec![
            Effect::Send {
                to: id,
                msg: ServerMsg::AssignId(AssignIdMsg { id }),
            },
            Effect::Send {
                to: id,
                msg: ServerMsg::AssignHost(AssignHostMsg { is_host }),
            },
            Effect::Broadcast(self.grid_msg()),
        ];
        (id, effects)
    }

    pub fn handle(&mut self, conn: u32, msg: ClientMsg) -> Vec<Effect> {
        match msg {
            ClientMsg::Join { user_name } => self.join(conn, &user_name),
            ClientMsg::StartGame => self.start(conn),
            ClientMsg::GenMaze => self.regenerate(conn),
            ClientMsg::Tilt {
                x_tilt,
                y_tilt,
                beta,
                gamma,
            } => self.tilt_event(
                conn,
                TiltSample {
                    x_tilt,
                    y_tilt,
                    beta,
                    gamma,
                },
            ),
        }
    }

    fn join(&mut self, conn: u32, user_name: &str) -> Vec<Effect> {
        match self.registry.join(conn, user_name, &self.config) {
            Ok(ball) => {
                let color = ball.color;
                tracing::info!("Connection {} joined as {:?}", conn, color);
                vec![
                    Effect::Send {
                        to: conn,
                        msg: ServerMsg::AssignColor(AssignColorMsg { color }),
                    },
                    Effect::Broadcast(self.players_msg()),
                ]
            }
            Err(_) => {
                tracing::info!("Connection {} denied: session full", conn);
                vec![Effect::Send {
                    to: conn,
                    msg: ServerMsg::JoinDenied,
                }]
            }
        }
    }

    fn start(&mut self, conn: u32) -> Vec<Effect> {
        if self.host != Some(conn) || self.phase != SessionPhase::Lobby {
            return Vec::new();
        }
        self.phase = SessionPhase::Running;
        tracing::info!("Game started by host {}", conn);
        vec![Effect::Broadcast(ServerMsg::GameStarted)]
    }

    fn regenerate(&mut self, conn: u32) -> Vec<Effect> {
        if self.host != Some(conn) {
            return Vec::new();
        }
        self.grid = maze::generate(self.config.cols(), self.config.rows(), &mut self.rng);
        vec![Effect::Broadcast(self.grid_msg())]
    }

    /// One simulation step: record the sample, fuse, integrate, resolve
    /// collisions, check the win condition. Ignored outside `Running`
    /// and for connections without a ball.
    fn tilt_event(&mut self, conn: u32, sample: TiltSample) -> Vec<Effect> {
        if self.phase != SessionPhase::Running || self.registry.get(conn).is_none() {
            return Vec::new();
        }

        self.tilt.record(conn, sample);
        let fused = self.tilt.fuse();
        let outcome = physics::step(fused.vector, &self.grid, self.registry.balls(), &self.config);
        self.registry.commit(outcome.balls);

        let mut effects = Vec::with_capacity(3);
        if let Some(&winner_conn) = outcome.winners.first() {
            if let Some(ball) = self.registry.get(winner_conn) {
                let user_name = ball.user_name.clone();
                let color = ball.color;
                self.phase = SessionPhase::Finished;
                self.winner = Some((user_name.clone(), color));
                tracing::info!("Winner: {} ({:?})", user_name, color);
                effects.push(Effect::Broadcast(ServerMsg::AnnounceWinner(
                    AnnounceWinnerMsg { user_name, color },
                )));
            }
        }
        effects.push(Effect::Broadcast(ServerMsg::TiltCanvas(TiltCanvasMsg {
            avg_gamma: fused.avg_gamma,
            avg_beta: fused.avg_beta,
        })));
        effects.push(Effect::Broadcast(self.players_msg()));
        effects
    }

    /// Remove the connection's ball and tilt sample together so a stale
    /// sample can never contribute to fusion again. When the last
    /// player leaves, the session resets to the lobby and tells clients
    /// to reload.
    pub fn disconnect(&mut self, conn: u32) -> Vec<Effect> {
        self.tilt.remove(conn);
        let removed = self.registry.leave(conn);
        if self.host == Some(conn) {
            self.host = None;
        }

        if removed.is_some() && self.registry.is_empty() {
            self.phase = SessionPhase::Lobby;
            self.winner = None;
            self.tilt.clear();
            tracing::info!("Last player left; session reset");
            return vec![Effect::Broadcast(ServerMsg::ReloadTab)];
        }

        vec![Effect::Broadcast(self.players_msg())]
    }

    fn grid_msg(&self) -> ServerMsg {
        ServerMsg::Grid(GridMsg {
            cells: self.grid.to_wire(),
        })
    }

    fn players_msg(&self) -> ServerMsg {
        ServerMsg::PlotPlayers(PlotPlayersMsg {
            players: self.registry.to_wire(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Ball;

    fn session() -> Session {
        Session::new(GameConfig::default(), 42)
    }

    fn tilt_msg(x: f64, y: f64) -> ClientMsg {
        ClientMsg::Tilt {
            x_tilt: x,
            y_tilt: y,
            beta: 0.0,
            gamma: 0.0,
        }
    }

    fn messages(effects: &[Effect]) -> Vec<&ServerMsg> {
        effects
            .iter()
            .map(|e| match e {
                Effect::Send { msg, .. } => msg,
                Effect::Broadcast(msg) => msg,
            })
            .collect()
    }

    #[test]
    fn first_connection_becomes_host() {
        let mut session = session();
        let (id_a, effects_a) = session.connect();
        let (id_b, effects_b) = session.connect();
        assert_eq!(session.host(), Some(id_a));
        assert_ne!(id_a, id_b);

        let host_flags: Vec<bool> = messages(&effects_a)
            .iter()
            .chain(messages(&effects_b).iter())
            .filter_map(|msg| match msg {
                ServerMsg::AssignHost(m) => Some(m.is_host),
                _ => None,
            })
            .collect();
        assert_eq!(host_flags, vec![true, false]);
    }

    #[test]
    fn connect_sends_grid_snapshot() {
        let mut session = session();
        let (_, effects) = session.connect();
        let has_grid = messages(&effects).iter().any(|msg| match msg {
            ServerMsg::Grid(g) => g.cells.len() == 15 && g.cells[0].len() == 15,
            _ => false,
        });
        assert!(has_grid);
    }

    #[test]
    fn join_assigns_color_and_broadcasts_players() {
        let mut session = session();
        let (id, _) = session.connect();
        let effects = session.handle(id, ClientMsg::Join { user_name: "alice".into() });
        assert!(matches!(
            &effects[0],
            Effect::Send { to, msg: ServerMsg::AssignColor(m) } if *to == id && m.color == BallColor::Blue
        ));
        assert!(matches!(
            &effects[1],
            Effect::Broadcast(ServerMsg::PlotPlayers(p)) if p.players.len() == 1
        ));
    }

    #[test]
    fn fifth_join_denied_registry_unchanged() {
        let mut session = session();
        let mut ids = Vec::new();
        for _ in 0..5 {
            let (id, _) = session.connect();
            ids.push(id);
        }
        for &id in &ids[..4] {
            session.handle(id, ClientMsg::Join { user_name: "p".into() });
        }
        let effects = session.handle(ids[4], ClientMsg::Join { user_name: "late".into() });
        assert!(matches!(
            &effects[0],
            Effect::Send { to, msg: ServerMsg::JoinDenied } if *to == ids[4]
        ));
        assert_eq!(session.registry().len(), 4);
    }

    #[test]
    fn only_host_can_start() {
        let mut session = session();
        let (host, _) = session.connect();
        let (other, _) = session.connect();
        session.handle(host, ClientMsg::Join { user_name: "h".into() });
        session.handle(other, ClientMsg::Join { user_name: "o".into() });

        assert!(session.handle(other, ClientMsg::StartGame).is_empty());
        assert_eq!(session.phase(), SessionPhase::Lobby);

        let effects = session.handle(host, ClientMsg::StartGame);
        assert!(matches!(&effects[0], Effect::Broadcast(ServerMsg::GameStarted)));
        assert_eq!(session.phase(), SessionPhase::Running);
    }

    #[test]
    fn only_host_can_regenerate_maze() {
        let mut session = session();
        let (host, _) = session.connect();
        let (other, _) = session.connect();
        assert!(session.handle(other, ClientMsg::GenMaze).is_empty());
        let effects = session.handle(host, ClientMsg::GenMaze);
        assert!(matches!(&effects[0], Effect::Broadcast(ServerMsg::Grid(_))));
    }

    #[test]
    fn tilt_ignored_outside_running() {
        let mut session = session();
        let (id, _) = session.connect();
        session.handle(id, ClientMsg::Join { user_name: "a".into() });
        assert!(session.handle(id, tilt_msg(1.0, 1.0)).is_empty());
    }

    #[test]
    fn tilt_from_spectator_ignored() {
        let mut session = session();
        let (host, _) = session.connect();
        let (spectator, _) = session.connect();
        session.handle(host, ClientMsg::Join { user_name: "a".into() });
        session.handle(host, ClientMsg::StartGame);
        assert!(session.handle(spectator, tilt_msg(1.0, 1.0)).is_empty());
    }

    #[test]
    fn tilt_steps_physics_and_broadcasts() {
        let mut session = session();
        let (id, _) = session.connect();
        session.handle(id, ClientMsg::Join { user_name: "a".into() });
        session.handle(id, ClientMsg::StartGame);

        let effects = session.handle(id, tilt_msg(2.0, 0.0));
        let msgs = messages(&effects);
        assert!(msgs.iter().any(|m| matches!(m, ServerMsg::TiltCanvas(_))));
        assert!(msgs.iter().any(|m| matches!(m, ServerMsg::PlotPlayers(_))));
        // Blue spawns at (10, 10); a positive x tilt moves it right.
        let ball = session.registry().get(id).unwrap();
        assert!(ball.x > 10.0);
    }

    #[test]
    fn winner_finishes_session_and_freezes_physics() {
        let mut session = session();
        let (id, _) = session.connect();
        session.handle(id, ClientMsg::Join { user_name: "alice".into() });
        session.handle(id, ClientMsg::StartGame);

        // Park the ball next to the hole, then step with zero tilt.
        let mut balls: Vec<Ball> = session.registry().balls().to_vec();
        balls[0].x = 289.0;
        balls[0].y = 290.0;
        session.registry.commit(balls);

        let effects = session.handle(id, tilt_msg(0.0, 0.0));
        let announced = messages(&effects).iter().any(|m| {
            matches!(m, ServerMsg::AnnounceWinner(w) if w.user_name == "alice" && w.color == BallColor::Blue)
        });
        assert!(announced);
        assert_eq!(session.phase(), SessionPhase::Finished);
        assert_eq!(
            session.winner(),
            Some(&("alice".to_string(), BallColor::Blue))
        );

        // Finished is terminal: further tilts do nothing.
        assert!(session.handle(id, tilt_msg(5.0, 5.0)).is_empty());
    }

    #[test]
    fn last_disconnect_resets_to_lobby() {
        let mut session = session();
        let (id, _) = session.connect();
        session.handle(id, ClientMsg::Join { user_name: "a".into() });
        session.handle(id, ClientMsg::StartGame);
        assert_eq!(session.phase(), SessionPhase::Running);

        let effects = session.disconnect(id);
        assert!(matches!(&effects[0], Effect::Broadcast(ServerMsg::ReloadTab)));
        assert_eq!(session.phase(), SessionPhase::Lobby);
        assert!(session.registry().is_empty());
        assert_eq!(session.tilt.reporter_count(), 0);
    }

    #[test]
    fn disconnect_removes_tilt_sample_from_fusion() {
        let mut session = session();
        let (a, _) = session.connect();
        let (b, _) = session.connect();
        session.handle(a, ClientMsg::Join { user_name: "a".into() });
        session.handle(b, ClientMsg::Join { user_name: "b".into() });
        session.handle(a, ClientMsg::StartGame);
        session.handle(a, tilt_msg(2.0, 0.0));
        session.handle(b, tilt_msg(4.0, 0.0));
        assert_eq!(session.tilt.reporter_count(), 2);

        session.disconnect(b);
        assert_eq!(session.tilt.reporter_count(), 1);
        let fused = session.tilt.fuse();
        assert!((fused.vector.x - 2.0).abs() < 1e-9);
    }

    #[test]
    fn spectator_disconnect_does_not_reset() {
        let mut session = session();
        let (player, _) = session.connect();
        let (spectator, _) = session.connect();
        session.handle(player, ClientMsg::Join { user_name: "a".into() });
        let effects = session.disconnect(spectator);
        assert!(!matches!(&effects[0], Effect::Broadcast(ServerMsg::ReloadTab)));
        assert_eq!(session.registry().len(), 1);
    }

    #[test]
    fn host_seat_reopens_after_host_leaves() {
        let mut session = session();
        let (host, _) = session.connect();
        let (_other, _) = session.connect();
        session.disconnect(host);
        assert_eq!(session.host(), None);
        let (late, effects) = session.connect();
        assert_eq!(session.host(), Some(late));
        let elected = messages(&effects).iter().any(|m| {
            matches!(m, ServerMsg::AssignHost(h) if h.is_host)
        });
        assert!(elected);
    }

    #[test]
    fn regenerated_maze_differs() {
        let mut session = session();
        let (host, _) = session.connect();
        let before = session.grid().to_wire();
        session.handle(host, ClientMsg::GenMaze);
        let after = session.grid().to_wire();
        let differs = before
            .iter()
            .zip(after.iter())
            .flat_map(|(a, b)| a.iter().zip(b.iter()))
            .any(|(a, b)| {
                a.walls.top != b.walls.top
                    || a.walls.right != b.walls.right
                    || a.walls.bottom != b.walls.bottom
                    || a.walls.left != b.walls.left
            });
        assert!(differs);
    }
}
