mod buildings;
mod helpers;
mod villages;

pub use buildings::*;
pub use helpers::{PLAYER_HEADER, status_for};
pub use villages::*;
