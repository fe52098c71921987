//! Maze representation and generation.
//!
//! A maze is built from a small grid of colored wall seeds (a [`Piece`]).
//! Seeds are spread over the left half of the board with walkable corridors
//! between them, same-colored neighbours are fused into wall blocks, and
//! the half is mirrored around the center column. Finally two tunnel
//! endpoints are opened on the left and right boundary columns.

use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::components::{Body, Point, Size};
use crate::config::{BoardOptions, Palette};
use crate::error::{ConfigError, GameError};

const BUILTIN_LAYOUT: &str = include_str!("../assets/static_board.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorClass {
    /// Index into the wall palette.
    Wall(usize),
    Walkable,
    Walked,
    Boundary,
    GhostStart,
}

impl ColorClass {
    pub fn is_passable(self) -> bool {
        matches!(self, ColorClass::Walkable | ColorClass::Walked)
    }

    pub fn color_name(self, palette: &Palette) -> &str {
        match self {
            ColorClass::Wall(index) => palette
                .wall
                .get(index)
                .map(String::as_str)
                .unwrap_or(palette.boundary.as_str()),
            ColorClass::Walkable => &palette.walkable,
            ColorClass::Walked => &palette.walked,
            ColorClass::Boundary => &palette.boundary,
            ColorClass::GhostStart => &palette.ghost_start,
        }
    }
}

/// Column and row of a tile. Serialized as `{ "x": col, "y": row }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    #[serde(rename = "x")]
    pub col: usize,
    #[serde(rename = "y")]
    pub row: usize,
}

impl TileCoord {
    pub const fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// Center of the tile in world units.
    pub position: Point,
    pub size: Size,
    pub color: ColorClass,
}

impl Tile {
    pub fn body(&self) -> Body {
        Body::new(self.position, self.size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGeometry {
    pub size: Size,
    pub offset: Point,
}

impl TileGeometry {
    pub fn center_of(&self, at: TileCoord) -> Point {
        Point::new(
            self.offset.x + at.col as i32 * self.size.width,
            self.offset.y + at.row as i32 * self.size.height,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tunnels {
    pub left: TileCoord,
    pub right: TileCoord,
}

/// The maze, indexed `[column][row]`.
#[derive(Debug, Clone)]
pub struct Grid {
    columns: Vec<Vec<Tile>>,
    geometry: TileGeometry,
    tunnels: Tunnels,
    walkable_remaining: usize,
}

impl Grid {
    /// Lays out tiles for a column-major color matrix and counts the
    /// reachable walkable tiles.
    pub fn from_colors(
        colors: Vec<Vec<ColorClass>>,
        geometry: TileGeometry,
        tunnels: Tunnels,
    ) -> Grid {
        let columns = colors
            .into_iter()
            .enumerate()
            .map(|(col, column)| {
                column
                    .into_iter()
                    .enumerate()
                    .map(|(row, color)| Tile {
                        position: geometry.center_of(TileCoord::new(col, row)),
                        size: geometry.size,
                        color,
                    })
                    .collect()
            })
            .collect();

        let mut grid = Grid {
            columns,
            geometry,
            tunnels,
            walkable_remaining: 0,
        };
        grid.walkable_remaining = grid.count_walkable();
        grid
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn height(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn columns(&self) -> &[Vec<Tile>] {
        &self.columns
    }

    pub fn tile(&self, at: TileCoord) -> Option<&Tile> {
        self.columns.get(at.col)?.get(at.row)
    }

    pub fn tiles(&self) -> impl Iterator<Item = (TileCoord, &Tile)> + '_ {
        self.columns.iter().enumerate().flat_map(|(col, column)| {
            column
                .iter()
                .enumerate()
                .map(move |(row, tile)| (TileCoord::new(col, row), tile))
        })
    }

    pub fn geometry(&self) -> TileGeometry {
        self.geometry
    }

    pub fn tunnels(&self) -> Tunnels {
        self.tunnels
    }

    /// Walkable tiles the player still has to visit. Zero means the game is won.
    pub fn walkable_remaining(&self) -> usize {
        self.walkable_remaining
    }

    /// An interior walkable tile whose four neighbours are all non-walkable.
    /// Tiles within the outer two rings are never isolated.
    pub fn is_isolated(&self, at: TileCoord) -> bool {
        let (width, height) = (self.width(), self.height());
        if at.col <= 1
            || at.row <= 1
            || at.col + 2 >= width
            || at.row + 2 >= height
        {
            return false;
        }
        [
            TileCoord::new(at.col - 1, at.row),
            TileCoord::new(at.col + 1, at.row),
            TileCoord::new(at.col, at.row - 1),
            TileCoord::new(at.col, at.row + 1),
        ]
        .iter()
        .all(|n| self.color_at(*n) != Some(ColorClass::Walkable))
    }

    pub fn count_walkable(&self) -> usize {
        self.tiles()
            .filter(|(at, tile)| tile.color == ColorClass::Walkable && !self.is_isolated(*at))
            .count()
    }

    /// Center of the middle column's last walkable row.
    pub fn player_start(&self) -> Point {
        let at = TileCoord::new(self.width() / 2, self.height().saturating_sub(2));
        self.geometry.center_of(at)
    }

    pub fn color_at(&self, at: TileCoord) -> Option<ColorClass> {
        self.tile(at).map(|tile| tile.color)
    }

    /// Column-major color names, as sent to observers.
    pub fn color_snapshot(&self, palette: &Palette) -> Vec<Vec<String>> {
        self.columns
            .iter()
            .map(|column| {
                column
                    .iter()
                    .map(|tile| tile.color.color_name(palette).to_string())
                    .collect()
            })
            .collect()
    }

    pub(crate) fn set_walked(&mut self, at: TileCoord) -> Result<(), GameError> {
        let remaining = self
            .walkable_remaining
            .checked_sub(1)
            .ok_or(GameError::WalkableUnderflow {
                col: at.col,
                row: at.row,
            })?;
        if let Some(tile) = self.columns.get_mut(at.col).and_then(|c| c.get_mut(at.row)) {
            tile.color = ColorClass::Walked;
            self.walkable_remaining = remaining;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceCell {
    pub color: usize,
}

/// A fixed piece layout, `[piece column][piece row]`, each cell naming a
/// wall palette index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticLayout {
    columns: Vec<Vec<PieceCell>>,
}

impl StaticLayout {
    pub fn new(columns: Vec<Vec<usize>>) -> Self {
        Self {
            columns: columns
                .into_iter()
                .map(|column| column.into_iter().map(|color| PieceCell { color }).collect())
                .collect(),
        }
    }

    /// The layout bundled with the game, sized for a 25x25 board.
    pub fn builtin() -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(BUILTIN_LAYOUT)?)
    }

    pub fn check(&self, columns: usize, rows: usize, palette: usize) -> Result<(), ConfigError> {
        let found_rows = self
            .columns
            .iter()
            .map(Vec::len)
            .find(|len| *len != rows)
            .unwrap_or(rows);
        if self.columns.len() != columns || found_rows != rows {
            return Err(ConfigError::StaticLayoutMismatch {
                expected_columns: columns,
                expected_rows: rows,
                found_columns: self.columns.len(),
                found_rows,
            });
        }
        if let Some(cell) = self.columns.iter().flatten().find(|c| c.color >= palette) {
            return Err(ConfigError::PaletteIndexOutOfRange {
                index: cell.color,
                palette,
            });
        }
        Ok(())
    }
}

/// Wall seeds, `[piece column][piece row]`. Only lives during generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    cells: Vec<Vec<usize>>,
}

impl Piece {
    pub fn random(columns: usize, rows: usize, palette: usize, rng: &mut impl Rng) -> Piece {
        let cells = (0..columns)
            .map(|_| (0..rows).map(|_| rng.gen_range(0..palette)).collect())
            .collect();
        Piece { cells }
    }

    pub fn from_layout(layout: &StaticLayout) -> Piece {
        let cells = layout
            .columns
            .iter()
            .map(|column| column.iter().map(|cell| cell.color).collect())
            .collect();
        Piece { cells }
    }

    pub fn columns(&self) -> &[Vec<usize>] {
        &self.cells
    }
}

/// Piece columns and rows needed for a board of `tile_count` tiles per side.
pub fn piece_dimensions(tile_count: usize) -> (usize, usize) {
    ((tile_count / 2) / 2, (tile_count / 2).saturating_sub(1))
}

pub fn generate(options: &BoardOptions, rng: &mut impl Rng) -> Result<Grid, ConfigError> {
    options.validate()?;

    let tiles = options.tile_counts.row;
    let (piece_columns, piece_rows) = piece_dimensions(tiles);
    let piece = match (&options.layout.static_layout, options.layout.random) {
        (Some(layout), false) => Piece::from_layout(layout),
        _ => Piece::random(piece_columns, piece_rows, options.colors.wall.len(), rng),
    };

    let mut half = expand_piece(&piece, tiles);
    merge_corridors(&mut half);
    let mut colors = mirror(half);
    let tunnels = open_tunnels(&mut colors, rng);

    let geometry = TileGeometry {
        size: options.tile_size,
        offset: options.tile_offset,
    };
    let grid = Grid::from_colors(colors, geometry, tunnels);
    info!(
        "[Maze] generated {}x{} grid ({} layout), {} walkable tiles, tunnels at rows {} and {}",
        grid.width(),
        grid.height(),
        if options.layout.random { "random" } else { "static" },
        grid.walkable_remaining(),
        tunnels.left.row,
        tunnels.right.row
    );
    Ok(grid)
}

fn spacer_column(height: usize) -> Vec<ColorClass> {
    let mut column = vec![ColorClass::Walkable; height];
    column[0] = ColorClass::Boundary;
    column[height - 1] = ColorClass::Boundary;
    column
}

// Left half of the board, center column last.
fn expand_piece(piece: &Piece, height: usize) -> Vec<Vec<ColorClass>> {
    let mut half = vec![vec![ColorClass::Boundary; height]];
    for seeds in piece.columns() {
        half.push(spacer_column(height));

        let mut column = Vec::with_capacity(height);
        column.push(ColorClass::Boundary);
        for &seed in seeds {
            column.push(ColorClass::Walkable);
            column.push(ColorClass::Wall(seed));
        }
        column.push(ColorClass::Walkable);
        column.push(ColorClass::Boundary);
        half.push(column);
    }
    half
}

fn same_class(a: ColorClass, b: ColorClass) -> Option<ColorClass> {
    (a == b && a != ColorClass::Walkable).then_some(a)
}

// Walkable tiles squeezed between two equal walls take the wall's color.
// The vertical pair is applied first and the horizontal pair overrides it.
// The center column only has a left neighbour yet, so it is checked
// vertically only.
fn merge_corridors(columns: &mut [Vec<ColorClass>]) {
    let width = columns.len();
    for col in 1..width {
        let height = columns[col].len();
        for row in 1..height.saturating_sub(1) {
            if columns[col][row] != ColorClass::Walkable {
                continue;
            }
            let vertical = same_class(columns[col][row - 1], columns[col][row + 1]);
            let horizontal = if col + 1 < width {
                same_class(columns[col - 1][row], columns[col + 1][row])
            } else {
                None
            };
            if let Some(color) = vertical {
                columns[col][row] = color;
            }
            if let Some(color) = horizontal {
                columns[col][row] = color;
            }
        }
    }
}

fn mirror(mut half: Vec<Vec<ColorClass>>) -> Vec<Vec<ColorClass>> {
    let reflected: Vec<Vec<ColorClass>> = half.iter().rev().skip(1).cloned().collect();
    half.extend(reflected);
    half
}

fn open_tunnels(columns: &mut [Vec<ColorClass>], rng: &mut impl Rng) -> Tunnels {
    let width = columns.len();
    let height = columns[0].len();
    let left = TileCoord::new(0, rng.gen_range(1..=height - 2));
    let right = TileCoord::new(width - 1, rng.gen_range(1..=height - 2));
    for end in [left, right] {
        columns[end.col][end.row] = ColorClass::Walkable;
    }
    Tunnels { left, right }
}
