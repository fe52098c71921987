use crate::components::{Actor, Direction, Point};
use crate::config::PlayerOptions;
use crate::level::Grid;
use crate::motion::{MotionController, StepOutcome, StepRule};

#[derive(Debug, Clone)]
pub struct Player {
    pub actor: Actor,
}

impl Player {
    pub fn new(options: &PlayerOptions, start: Point) -> Self {
        Self {
            actor: Actor::new(start, options.size, options.speed, options.color.clone()),
        }
    }

    pub fn spawn(options: &PlayerOptions, grid: &Grid) -> Self {
        Self::new(options, grid.player_start())
    }

    /// Applies the requested direction, if any, then moves. A blocked request
    /// stays queued while the player keeps its committed direction.
    ///
    /// Returns the center the player left, so the tile can be marked as
    /// walked once every actor has moved.
    pub fn update(
        &mut self,
        motion: &MotionController,
        grid: &Grid,
        requested: Option<Direction>,
    ) -> Option<Point> {
        if let Some(direction) = requested {
            self.actor.moves.waiting = direction;
        }

        let left = self.actor.body.center;
        let waiting = self.actor.moves.waiting;
        if motion.step(grid, &mut self.actor, waiting, StepRule::Open) == StepOutcome::Moved {
            return Some(left);
        }

        let current = self.actor.moves.current;
        if current != waiting
            && motion.step(grid, &mut self.actor, current, StepRule::Open) == StepOutcome::Moved
        {
            return Some(left);
        }
        None
    }
}
