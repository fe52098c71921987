//! Game options.
//!
//! The option tree mirrors the JSON accepted by [`GameOptions::load`]. Every
//! field has a default, so a config file only needs the values it changes.
//! Options are validated once, before a maze is generated, and are passed
//! around by reference afterwards.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::components::{Point, Size};
use crate::error::ConfigError;
use crate::ghost::GhostVariant;
use crate::level::{piece_dimensions, StaticLayout, TileCoord};

/// Color names for every tile class. Walls pick from `wall` by index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Palette {
    pub wall: Vec<String>,
    pub walkable: String,
    pub walked: String,
    pub boundary: String,
    pub ghost_start: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            wall: ["red", "yellow", "blue", "orange"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            walkable: "black".to_string(),
            walked: "white".to_string(),
            boundary: "slategray".to_string(),
            ghost_start: "green".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileCounts {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub random: bool,
    #[serde(rename = "static", skip_serializing_if = "Option::is_none")]
    pub static_layout: Option<StaticLayout>,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            random: true,
            static_layout: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoardOptions {
    pub colors: Palette,
    pub tile_counts: TileCounts,
    pub tile_size: Size,
    /// Position of the first tile's center relative to the world origin.
    pub tile_offset: Point,
    pub layout: Layout,
}

impl Default for BoardOptions {
    fn default() -> Self {
        Self {
            colors: Palette::default(),
            tile_counts: TileCounts { row: 25, col: 25 },
            tile_size: Size::new(30, 30),
            tile_offset: Point::new(30, 30),
            layout: Layout::default(),
        }
    }
}

impl BoardOptions {
    /// Checks everything maze generation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let TileCounts { row, col } = self.tile_counts;
        if row != col {
            return Err(ConfigError::NonSquareGrid { row, col });
        }
        if row < 5 || row % 4 != 1 {
            return Err(ConfigError::UnsupportedTileCount(row));
        }
        if self.colors.wall.is_empty() {
            return Err(ConfigError::EmptyWallPalette);
        }

        let size = self.tile_size;
        if size.width <= 0 || size.height <= 0 || size.width % 2 != 0 || size.height % 2 != 0 {
            return Err(ConfigError::InvalidTileSize {
                width: size.width,
                height: size.height,
            });
        }

        if !self.layout.random {
            let layout = self
                .layout
                .static_layout
                .as_ref()
                .ok_or(ConfigError::MissingStaticLayout)?;
            let (columns, rows) = piece_dimensions(row);
            layout.check(columns, rows, self.colors.wall.len())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerOptions {
    pub size: Size,
    pub color: String,
    pub speed: i32,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            size: Size::new(30, 30),
            color: "#B3B3B3".to_string(),
            speed: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GhostOptions {
    pub start: TileCoord,
    pub size: Size,
    pub color: String,
    pub speed: i32,
    #[serde(default)]
    pub variant: GhostVariant,
}

impl GhostOptions {
    fn new(col: usize, row: usize, color: &str, speed: i32, variant: GhostVariant) -> Self {
        Self {
            start: TileCoord::new(col, row),
            size: Size::new(30, 30),
            color: color.to_string(),
            speed,
            variant,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkOptions {
    /// Players in a multiplayer match; everyone but the maze runner drives a ghost.
    pub max_players: usize,
}

impl Default for NetworkOptions {
    fn default() -> Self {
        Self { max_players: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOptions {
    pub board: BoardOptions,
    pub player: PlayerOptions,
    pub ghosts: Vec<GhostOptions>,
    pub network: NetworkOptions,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            board: BoardOptions::default(),
            player: PlayerOptions::default(),
            ghosts: vec![
                GhostOptions::new(1, 1, "pink", 2, GhostVariant::Pursuer),
                GhostOptions::new(23, 1, "cyan", 2, GhostVariant::Pursuer),
                GhostOptions::new(1, 11, "darksalmon", 1, GhostVariant::Roamer),
                GhostOptions::new(23, 11, "lawngreen", 1, GhostVariant::Roamer),
            ],
            network: NetworkOptions::default(),
        }
    }
}

impl GameOptions {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let options: GameOptions = serde_json::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Switches to the bundled static layout.
    pub fn use_builtin_layout(&mut self) -> Result<(), ConfigError> {
        self.board.layout = Layout {
            random: false,
            static_layout: Some(StaticLayout::builtin()?),
        };
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.board.validate()?;
        let size = self.board.tile_size;
        let TileCounts { row, col } = self.board.tile_counts;

        check_speed("player", self.player.speed, size)?;
        for ghost in &self.ghosts {
            check_speed(&ghost.color, ghost.speed, size)?;
            if ghost.start.col >= col || ghost.start.row >= row {
                return Err(ConfigError::GhostStartOutOfRange {
                    color: ghost.color.clone(),
                    col: ghost.start.col,
                    row: ghost.start.row,
                });
            }
        }
        Ok(())
    }
}

// Actors only line up with tile centers when their speed divides the tile size.
fn check_speed(actor: &str, speed: i32, tile: Size) -> Result<(), ConfigError> {
    if speed <= 0 || tile.width % speed != 0 || tile.height % speed != 0 {
        return Err(ConfigError::InvalidSpeed {
            actor: actor.to_string(),
            speed,
        });
    }
    Ok(())
}
