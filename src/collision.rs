//! Overlap tests and walkability queries against the maze.
//!
//! Every query is a linear scan over the grid; callers keep the number of
//! queries per tick small (a handful per actor).

use serde::Serialize;

use crate::components::{Body, Point};
use crate::error::GameError;
use crate::level::{ColorClass, Grid, TileCoord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Range {
    pub min: i32,
    pub max: i32,
}

/// World-space extents of the tile centers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Boundaries {
    pub horizontal: Range,
    pub vertical: Range,
}

/// True when the two boxes overlap. Touching edges do not count, and a body
/// never collides with itself.
pub fn colliding(a: &Body, b: &Body) -> bool {
    if std::ptr::eq(a, b) {
        return false;
    }
    let (aw, ah) = (a.size.width / 2, a.size.height / 2);
    let (bw, bh) = (b.size.width / 2, b.size.height / 2);
    !(a.center.x + aw <= b.center.x - bw
        || a.center.y + ah <= b.center.y - bh
        || a.center.x - aw >= b.center.x + bw
        || a.center.y - ah >= b.center.y + bh)
}

/// Whether `body` moved by `(dx, dy)` stays clear of every blocking tile.
pub fn is_walkable_position(grid: &Grid, body: &Body, dx: i32, dy: i32) -> bool {
    let moved = body.translated(dx, dy);
    !grid
        .columns()
        .iter()
        .flatten()
        .any(|tile| !tile.color.is_passable() && colliding(&tile.body(), &moved))
}

/// Tile whose cell contains `point`. Cells start at the tile center minus the
/// configured offset, so actors look themselves up by their top-left corner.
pub fn tile_coordinates(grid: &Grid, point: Point) -> Option<TileCoord> {
    let offset = grid.geometry().offset;
    grid.tiles().find_map(|(at, tile)| {
        let left = tile.position.x - offset.x;
        let top = tile.position.y - offset.y;
        let inside = point.x >= left
            && point.x <= left + tile.size.width
            && point.y >= top
            && point.y <= top + tile.size.height;
        inside.then_some(at)
    })
}

/// Marks the walkable tile centered exactly on `center` as walked. Actors
/// in transit between tiles mark nothing. Returns whether the tile changed.
pub fn mark_walked(grid: &mut Grid, center: Point) -> Result<bool, GameError> {
    let found = grid
        .tiles()
        .find(|(_, tile)| tile.position == center)
        .map(|(at, tile)| (at, tile.color));
    match found {
        Some((at, ColorClass::Walkable)) => {
            grid.set_walked(at)?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

pub fn boundaries(grid: &Grid) -> Boundaries {
    let geometry = grid.geometry();
    let last = TileCoord::new(
        grid.width().saturating_sub(1),
        grid.height().saturating_sub(1),
    );
    let far = geometry.center_of(last);
    Boundaries {
        horizontal: Range {
            min: geometry.offset.x,
            max: far.x,
        },
        vertical: Range {
            min: geometry.offset.y,
            max: far.y,
        },
    }
}

pub fn out_of_bounds(bounds: &Boundaries, point: Point) -> bool {
    point.x < bounds.horizontal.min
        || point.x > bounds.horizontal.max
        || point.y < bounds.vertical.min
        || point.y > bounds.vertical.max
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Size;
    use crate::level::{TileGeometry, Tunnels};

    use ColorClass::{Boundary as B, Walkable as O, Walked as W};

    // Rows as drawn; transposed into the column-major layout.
    fn grid_from_rows(rows: &[&[ColorClass]]) -> Grid {
        let width = rows[0].len();
        let colors = (0..width)
            .map(|col| rows.iter().map(|row| row[col]).collect())
            .collect();
        Grid::from_colors(
            colors,
            TileGeometry {
                size: Size::new(30, 30),
                offset: Point::new(30, 30),
            },
            Tunnels {
                left: TileCoord::new(0, 1),
                right: TileCoord::new(width - 1, 1),
            },
        )
    }

    fn small_grid() -> Grid {
        let wall = ColorClass::Wall(2);
        grid_from_rows(&[
            &[B, B, B, B, B],
            &[B, O, O, W, B],
            &[B, O, wall, O, B],
            &[B, B, B, B, B],
        ])
    }

    fn body_at(center: Point) -> Body {
        Body::new(center, Size::new(30, 30))
    }

    #[test]
    fn touching_edges_do_not_collide() {
        let a = body_at(Point::new(30, 30));
        let b = body_at(Point::new(60, 30));
        assert!(!colliding(&a, &b));
        assert!(colliding(&a, &body_at(Point::new(59, 30))));
    }

    #[test]
    fn a_body_never_collides_with_itself() {
        let a = body_at(Point::new(30, 30));
        assert!(!colliding(&a, &a));
        let copy = a;
        assert!(colliding(&a, &copy));
    }

    #[test]
    fn walkability_follows_tile_classes() {
        let grid = small_grid();
        let on_walkable = body_at(Point::new(60, 60));
        assert!(is_walkable_position(&grid, &on_walkable, 30, 0));
        assert!(is_walkable_position(&grid, &on_walkable, 60, 0), "walked tiles are passable");
        assert!(!is_walkable_position(&grid, &on_walkable, 0, -3), "boundary above");
        assert!(!is_walkable_position(&grid, &on_walkable, 3, 30), "wall below-right");
        assert!(is_walkable_position(&grid, &on_walkable, 0, 30));
    }

    #[test]
    fn corner_points_map_to_tiles() {
        let grid = small_grid();
        let actor = body_at(Point::new(90, 60));
        assert_eq!(tile_coordinates(&grid, actor.corner()), Some(TileCoord::new(2, 1)));
        assert_eq!(tile_coordinates(&grid, Point::new(-40, 10)), None);
        assert_eq!(tile_coordinates(&grid, Point::new(10, 1000)), None);
    }

    #[test]
    fn marking_requires_a_centered_actor() {
        let mut grid = small_grid();
        let before = grid.walkable_remaining();
        assert_eq!(mark_walked(&mut grid, Point::new(93, 60)), Ok(false));
        assert_eq!(grid.walkable_remaining(), before);
    }

    #[test]
    fn marking_counts_each_tile_once() {
        let mut grid = small_grid();
        let before = grid.walkable_remaining();
        let centered = Point::new(90, 60);
        assert_eq!(mark_walked(&mut grid, centered), Ok(true));
        assert_eq!(grid.walkable_remaining(), before - 1);
        assert_eq!(grid.color_at(TileCoord::new(2, 1)), Some(W));
        assert_eq!(mark_walked(&mut grid, centered), Ok(false));
        assert_eq!(grid.walkable_remaining(), before - 1);
    }

    #[test]
    fn marking_past_zero_is_a_fault() {
        let mut grid = grid_from_rows(&[&[B, B, B], &[B, O, B], &[B, B, B]]);
        assert_eq!(mark_walked(&mut grid, Point::new(60, 60)), Ok(true));
        assert_eq!(grid.walkable_remaining(), 0);
        assert_eq!(
            grid.set_walked(TileCoord::new(1, 1)),
            Err(GameError::WalkableUnderflow { col: 1, row: 1 })
        );
        assert_eq!(grid.walkable_remaining(), 0);
    }

    #[test]
    fn marking_does_not_depend_on_actor_size() {
        let mut grid = small_grid();
        let small = Body::new(Point::new(60, 60), Size::new(20, 20));
        assert_eq!(mark_walked(&mut grid, small.center), Ok(true));
        assert_eq!(grid.color_at(TileCoord::new(1, 1)), Some(W));
    }

    #[test]
    fn boundaries_span_first_to_last_tile_center() {
        let grid = small_grid();
        let bounds = boundaries(&grid);
        assert_eq!(bounds.horizontal, Range { min: 30, max: 150 });
        assert_eq!(bounds.vertical, Range { min: 30, max: 120 });
        assert!(out_of_bounds(&bounds, Point::new(27, 60)));
        assert!(!out_of_bounds(&bounds, Point::new(150, 120)));
    }
}
