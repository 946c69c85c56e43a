//! The single-owner game loop task. All session state lives here; ws
//! connection tasks talk to it over channels.
//!
//! There is no tick timer. The simulation advances once per accepted
//! tilt event, so step cadence follows whichever client is currently
//! reporting.

use crate::config::ServerConfig;
use crate::session::{Effect, Session};
use maze_shared::protocol::ClientMsg;
use tokio::sync::{broadcast, mpsc, oneshot};

/// Commands from client connections to the game loop
pub enum GameCommand {
    Connect {
        response: oneshot::Sender<u32>,
    },
    Client {
        conn: u32,
        msg: ClientMsg,
    },
    Disconnect {
        conn: u32,
    },
}

/// Run the main game loop. Owns all game state.
pub async fn run_game_loop(
    mut cmd_rx: mpsc::Receiver<GameCommand>,
    broadcast_tx: broadcast::Sender<Effect>,
    config: ServerConfig,
) {
    let mut session = Session::new(config.game.clone(), config.rng_seed);

    while let Some(cmd) = cmd_rx.recv().await {
        let effects = match cmd {
            GameCommand::Connect { response } => {
                let (conn, effects) = session.connect();
                if response.send(conn).is_err() {
                    // Connection task went away before getting its id.
                    session.disconnect(conn);
                }
                effects
            }
            GameCommand::Client { conn, msg } => session.handle(conn, msg),
            GameCommand::Disconnect { conn } => session.disconnect(conn),
        };

        for effect in effects {
            // Send fails only when no connection is subscribed.
            let _ = broadcast_tx.send(effect);
        }
    }

    tracing::info!("Game loop ended");
}
