use std::io;

use thiserror::Error;

/// Rejected configuration. Raised before any part of a grid is built.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("tile counts must describe a square grid, got {row} rows and {col} columns")]
    NonSquareGrid { row: usize, col: usize },

    #[error("tile count {0} is unsupported: it must be odd, of the form 4k+1 and at least 5")]
    UnsupportedTileCount(usize),

    #[error("wall palette is empty")]
    EmptyWallPalette,

    #[error("tile size {width}x{height} must be positive and even")]
    InvalidTileSize { width: i32, height: i32 },

    #[error("static layout requested but none was supplied")]
    MissingStaticLayout,

    #[error(
        "static layout has {found_columns}x{found_rows} pieces, tile counts require {expected_columns}x{expected_rows}"
    )]
    StaticLayoutMismatch {
        expected_columns: usize,
        expected_rows: usize,
        found_columns: usize,
        found_rows: usize,
    },

    #[error("piece color {index} is outside the wall palette of {palette} colors")]
    PaletteIndexOutOfRange { index: usize, palette: usize },

    #[error("{actor} speed {speed} must be positive and divide the tile size")]
    InvalidSpeed { actor: String, speed: i32 },

    #[error("ghost {color} starts at tile ({col}, {row}), outside the grid")]
    GhostStartOutOfRange { color: String, col: usize, row: usize },

    #[error("failed to read configuration from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Faults raised while a game is running.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("walkable tile count would go negative when marking tile ({col}, {row})")]
    WalkableUnderflow { col: usize, row: usize },

    #[error("game halted after an earlier fault")]
    Halted,
}

/// Inbound network data that could not be converted into a message.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected message shape: {0}")]
    UnexpectedShape(String),

    #[error("direction update without an actor color")]
    EmptyColor,

    #[error("unknown direction {0:?}")]
    UnknownDirection(String),
}
