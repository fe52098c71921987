//! A* search over a column-major world.
//!
//! Moves are North, East, South, West with a uniform cost of one step and a
//! Manhattan heuristic. The open set is a plain vector scanned for the
//! lowest `f`; ties go to the node inserted first, so results are
//! reproducible.
//!
//! A cell is marked visited when it is first discovered and is never
//! reopened, even if a cheaper route to it shows up later. With uniform
//! costs this still yields shortest paths in practice; weighted costs would
//! need a decrease-key step.

use crate::level::TileCoord;

#[derive(Debug, Clone, Copy)]
struct PathNode {
    coords: TileCoord,
    parent: Option<usize>,
    g: usize,
    f: usize,
}

fn manhattan(a: TileCoord, b: TileCoord) -> usize {
    a.col.abs_diff(b.col) + a.row.abs_diff(b.row)
}

fn neighbours<T>(
    world: &[Vec<T>],
    at: TileCoord,
    is_walkable: &impl Fn(&T) -> bool,
) -> Vec<TileCoord> {
    let width = world.len();
    let height = world.first().map_or(0, Vec::len);
    let mut result = Vec::with_capacity(4);
    let mut push = |col: usize, row: usize| {
        if world
            .get(col)
            .and_then(|column| column.get(row))
            .is_some_and(|cell| is_walkable(cell))
        {
            result.push(TileCoord::new(col, row));
        }
    };
    if at.row > 0 {
        push(at.col, at.row - 1);
    }
    if at.col + 1 < width {
        push(at.col + 1, at.row);
    }
    if at.row + 1 < height {
        push(at.col, at.row + 1);
    }
    if at.col > 0 {
        push(at.col - 1, at.row);
    }
    result
}

/// Shortest path from `start` to `goal`, both included. An empty path means
/// the goal cannot be reached; callers pick their own fallback.
pub fn find_path<T>(
    world: &[Vec<T>],
    start: TileCoord,
    goal: TileCoord,
    is_walkable: impl Fn(&T) -> bool,
) -> Vec<TileCoord> {
    let width = world.len();
    let height = world.first().map_or(0, Vec::len);
    if start.col >= width || start.row >= height || goal.col >= width || goal.row >= height {
        return Vec::new();
    }

    let index = |at: TileCoord| at.col + at.row * width;
    let mut visited = vec![false; width * height];
    let mut nodes = vec![PathNode {
        coords: start,
        parent: None,
        g: 0,
        f: manhattan(start, goal),
    }];
    let mut open: Vec<usize> = vec![0];
    visited[index(start)] = true;

    while !open.is_empty() {
        let mut best = 0;
        for (i, &node) in open.iter().enumerate().skip(1) {
            if nodes[node].f < nodes[open[best]].f {
                best = i;
            }
        }
        let current = open.remove(best);
        let node = nodes[current];

        if index(node.coords) == index(goal) {
            let mut path = Vec::new();
            let mut cursor = Some(current);
            while let Some(i) = cursor {
                path.push(nodes[i].coords);
                cursor = nodes[i].parent;
            }
            path.reverse();
            return path;
        }

        for next in neighbours(world, node.coords, &is_walkable) {
            if visited[index(next)] {
                continue;
            }
            visited[index(next)] = true;
            let g = node.g + manhattan(next, node.coords);
            nodes.push(PathNode {
                coords: next,
                parent: Some(current),
                g,
                f: g + manhattan(next, goal),
            });
            open.push(nodes.len() - 1);
        }
    }

    Vec::new()
}
