use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The four ball colors, in palette order. At most one active ball per
/// color, so a session holds at most four players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/src/generated/")]
#[serde(rename_all = "lowercase")]
pub enum BallColor {
    Blue,
    Red,
    Purple,
    Green,
}

impl BallColor {
    pub const PALETTE: [BallColor; 4] = [
        BallColor::Blue,
        BallColor::Red,
        BallColor::Purple,
        BallColor::Green,
    ];
}

// === Client -> Server ===

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/src/generated/")]
#[serde(tag = "type")]
pub enum ClientMsg {
    #[serde(rename = "join")]
    Join {
        #[serde(rename = "userName")]
        user_name: String,
    },
    #[serde(rename = "startGame")]
    StartGame,
    #[serde(rename = "genMaze")]
    GenMaze,
    #[serde(rename = "tilt")]
    Tilt {
        #[serde(rename = "xTilt")]
        x_tilt: f64,
        #[serde(rename = "yTilt")]
        y_tilt: f64,
        beta: f64,
        gamma: f64,
    },
}

// === Server -> Client ===

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/src/generated/")]
#[serde(tag = "type")]
pub enum ServerMsg {
    #[serde(rename = "assignID")]
    AssignId(AssignIdMsg),
    #[serde(rename = "assignHost")]
    AssignHost(AssignHostMsg),
    #[serde(rename = "assignColor")]
    AssignColor(AssignColorMsg),
    #[serde(rename = "joinDenied")]
    JoinDenied,
    #[serde(rename = "grid")]
    Grid(GridMsg),
    #[serde(rename = "gameStarted")]
    GameStarted,
    #[serde(rename = "plotPlayers")]
    PlotPlayers(PlotPlayersMsg),
    #[serde(rename = "tiltCanvas")]
    TiltCanvas(TiltCanvasMsg),
    #[serde(rename = "announceWinner")]
    AnnounceWinner(AnnounceWinnerMsg),
    #[serde(rename = "reloadTab")]
    ReloadTab,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/src/generated/")]
pub struct AssignIdMsg {
    pub id: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct AssignHostMsg {
    pub is_host: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/src/generated/")]
pub struct AssignColorMsg {
    pub color: BallColor,
}

/// Full wall-state snapshot, column-major (`cells[col][row]`).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/src/generated/")]
pub struct GridMsg {
    pub cells: Vec<Vec<CellWire>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/src/generated/")]
pub struct CellWire {
    pub col: u32,
    pub row: u32,
    pub walls: WallsWire,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/src/generated/")]
pub struct WallsWire {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/src/generated/")]
pub struct PlotPlayersMsg {
    pub players: Vec<BallWire>,
}

/// One player's ball as broadcast each step.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct BallWire {
    pub id: u32,
    pub user_name: String,
    pub color: BallColor,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub dx: f64,
    pub dy: f64,
}

/// Fused raw orientation values, for the clients' shared tilt display.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct TiltCanvasMsg {
    pub avg_gamma: f64,
    pub avg_beta: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct AnnounceWinnerMsg {
    pub user_name: String,
    pub color: BallColor,
}

/// Round to 2 decimal places (plenty for arena units, trims JSON size)
#[inline]
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
