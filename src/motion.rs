//! Directional stepping shared by the player and the ghosts.

use crate::collision::{boundaries, is_walkable_position, Boundaries};
use crate::components::{Actor, Direction, Point};
use crate::level::Grid;

/// How strictly a step is checked before the actor moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepRule {
    /// The decision is already made; move without checking.
    Forced,
    /// Move whenever the destination is clear.
    Open,
    /// Move only along a corridor: the destination is clear and neither
    /// perpendicular direction is.
    Corridor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved,
    /// Blocked, or standing on a junction under [`StepRule::Corridor`].
    DecisionNeeded,
}

/// Moves actors through one grid. Holds the grid extents and tunnel
/// endpoints so that actors leaving the board re-enter on the other side.
#[derive(Debug, Clone, Copy)]
pub struct MotionController {
    bounds: Boundaries,
    left_tunnel: Point,
    right_tunnel: Point,
}

impl MotionController {
    pub fn new(grid: &Grid) -> Self {
        let geometry = grid.geometry();
        let tunnels = grid.tunnels();
        Self {
            bounds: boundaries(grid),
            left_tunnel: geometry.center_of(tunnels.left),
            right_tunnel: geometry.center_of(tunnels.right),
        }
    }

    pub fn can_move(&self, grid: &Grid, actor: &Actor, direction: Direction) -> bool {
        let (dx, dy) = direction.delta(actor.speed);
        is_walkable_position(grid, &actor.body, dx, dy)
    }

    /// True when the actor could also turn onto the other axis.
    pub fn at_junction(&self, grid: &Grid, actor: &Actor, direction: Direction) -> bool {
        direction
            .perpendicular()
            .iter()
            .any(|turn| self.can_move(grid, actor, *turn))
    }

    pub fn step(
        &self,
        grid: &Grid,
        actor: &mut Actor,
        direction: Direction,
        rule: StepRule,
    ) -> StepOutcome {
        let allowed = match rule {
            StepRule::Forced => true,
            StepRule::Open => self.can_move(grid, actor, direction),
            StepRule::Corridor => {
                self.can_move(grid, actor, direction)
                    && !self.at_junction(grid, actor, direction)
            }
        };
        if !allowed {
            return StepOutcome::DecisionNeeded;
        }

        let (dx, dy) = direction.delta(actor.speed);
        actor.body = actor.body.translated(dx, dy);
        actor.moves.current = direction;
        self.wrap_through_tunnel(actor);
        StepOutcome::Moved
    }

    fn wrap_through_tunnel(&self, actor: &mut Actor) {
        let x = actor.body.center.x;
        if x < self.bounds.horizontal.min {
            actor.body.center = self.right_tunnel;
        } else if x > self.bounds.horizontal.max {
            actor.body.center = self.left_tunnel;
        }
    }
}
