//! Types shared between the maze server and clients: wire protocol
//! messages and game tuning constants.

pub mod config;
pub mod protocol;
