use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Position in [`Direction::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Translation applied by one step of `speed` world units.
    pub fn delta(self, speed: i32) -> (i32, i32) {
        match self {
            Direction::Up => (0, -speed),
            Direction::Down => (0, speed),
            Direction::Left => (-speed, 0),
            Direction::Right => (speed, 0),
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// The two directions on the other axis.
    pub fn perpendicular(self) -> [Direction; 2] {
        if self.is_horizontal() {
            [Direction::Up, Direction::Down]
        } else {
            [Direction::Left, Direction::Right]
        }
    }

    pub fn random(rng: &mut impl Rng) -> Direction {
        Direction::ALL[rng.gen_range(0..Direction::ALL.len())]
    }
}

/// A point in world units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned box described by its center.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Body {
    pub center: Point,
    pub size: Size,
}

impl Body {
    pub fn new(center: Point, size: Size) -> Self {
        Self { center, size }
    }

    /// Top-left corner, the point used for tile lookups.
    pub fn corner(&self) -> Point {
        self.center
            .offset(-self.size.width / 2, -self.size.height / 2)
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Body {
        Body {
            center: self.center.offset(dx, dy),
            size: self.size,
        }
    }
}

/// Committed direction plus the one requested for the next opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveDirection {
    pub current: Direction,
    pub waiting: Direction,
}

impl Default for MoveDirection {
    fn default() -> Self {
        Self {
            current: Direction::Left,
            waiting: Direction::Left,
        }
    }
}

/// State shared by the player and every ghost.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub body: Body,
    pub speed: i32,
    pub moves: MoveDirection,
    pub color: String,
}

impl Actor {
    pub fn new(center: Point, size: Size, speed: i32, color: impl Into<String>) -> Self {
        Self {
            body: Body::new(center, size),
            speed,
            moves: MoveDirection::default(),
            color: color.into(),
        }
    }

    pub fn commit(&mut self, direction: Direction) {
        self.moves.current = direction;
        self.moves.waiting = direction;
    }
}
