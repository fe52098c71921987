use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::collision::tile_coordinates;
use crate::components::{Actor, Body, Direction};
use crate::config::GhostOptions;
use crate::level::{Grid, TileCoord};
use crate::motion::{MotionController, StepOutcome, StepRule};
use crate::network::Inbox;
use crate::pathfinding::find_path;

/// How a locally driven ghost picks a direction when no path is found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GhostVariant {
    /// Draws a fresh random direction at the moment of the decision.
    #[default]
    Pursuer,
    /// Keeps re-sampling a random direction on every tick and falls back to
    /// the latest sample.
    Roamer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GhostState {
    FollowingDirection,
    Replanning,
    ExternallyDriven,
}

#[derive(Debug, Clone)]
pub struct Ghost {
    pub actor: Actor,
    pub variant: GhostVariant,
    state: GhostState,
    idle_direction: Direction,
    replans: u32,
}

impl Ghost {
    pub fn spawn(options: &GhostOptions, grid: &Grid, externally_driven: bool) -> Self {
        let center = grid.geometry().center_of(options.start);
        let state = if externally_driven {
            GhostState::ExternallyDriven
        } else {
            GhostState::FollowingDirection
        };
        Self {
            actor: Actor::new(center, options.size, options.speed, options.color.clone()),
            variant: options.variant,
            state,
            idle_direction: Direction::Left,
            replans: 0,
        }
    }

    pub fn state(&self) -> GhostState {
        self.state
    }

    /// Number of times this ghost has searched for a path.
    pub fn replans(&self) -> u32 {
        self.replans
    }

    pub fn update(
        &mut self,
        motion: &MotionController,
        grid: &Grid,
        target: &Body,
        inbox: &Inbox,
        rng: &mut impl Rng,
    ) {
        match self.state {
            GhostState::ExternallyDriven => self.update_external(motion, grid, inbox),
            _ => self.update_local(motion, grid, target, rng),
        }
    }

    /// Follows corridors and replans towards `target` at junctions and dead
    /// ends. The chosen direction is taken on the same tick.
    pub fn update_local(
        &mut self,
        motion: &MotionController,
        grid: &Grid,
        target: &Body,
        rng: &mut impl Rng,
    ) {
        if self.variant == GhostVariant::Roamer {
            self.idle_direction = Direction::random(rng);
        }

        let current = self.actor.moves.current;
        if motion.step(grid, &mut self.actor, current, StepRule::Corridor) == StepOutcome::Moved {
            return;
        }

        self.state = GhostState::Replanning;
        let direction = self.decide(grid, target, rng);
        self.actor.commit(direction);
        motion.step(grid, &mut self.actor, direction, StepRule::Forced);
        self.state = GhostState::FollowingDirection;
    }

    fn decide(&mut self, grid: &Grid, target: &Body, rng: &mut impl Rng) -> Direction {
        self.replans += 1;
        let start = tile_coordinates(grid, self.actor.body.corner());
        let goal = tile_coordinates(grid, target.corner());

        if let (Some(start), Some(goal)) = (start, goal) {
            let path = find_path(grid.columns(), start, goal, |tile| tile.color.is_passable());
            if let Some(&next) = path.get(1) {
                let direction = direction_towards(start, next);
                debug!(
                    "[Ghost] {} replanned {:?} -> {:?}: {} steps, heading {:?}",
                    self.actor.color,
                    start,
                    goal,
                    path.len(),
                    direction
                );
                return direction;
            }
        }

        let fallback = match self.variant {
            GhostVariant::Pursuer => Direction::random(rng),
            GhostVariant::Roamer => self.idle_direction,
        };
        debug!(
            "[Ghost] {} found no path, falling back to {:?}",
            self.actor.color, fallback
        );
        fallback
    }

    /// Steers by the latest message for this ghost's color. A blocked request
    /// falls back to a forced step in the committed direction, so a remote
    /// ghost never stalls.
    pub fn update_external(&mut self, motion: &MotionController, grid: &Grid, inbox: &Inbox) {
        if let Some(direction) = inbox.direction_for(&self.actor.color) {
            self.actor.moves.waiting = direction;
        }

        let requested = self.actor.moves.waiting;
        if motion.step(grid, &mut self.actor, requested, StepRule::Open) == StepOutcome::Moved {
            return;
        }
        let current = self.actor.moves.current;
        motion.step(grid, &mut self.actor, current, StepRule::Forced);
    }
}

/// Direction of a single step between adjacent tiles.
fn direction_towards(from: TileCoord, to: TileCoord) -> Direction {
    if to.col < from.col {
        Direction::Left
    } else if to.col > from.col {
        Direction::Right
    } else if to.row < from.row {
        Direction::Up
    } else {
        Direction::Down
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Point, Size};
    use crate::level::{ColorClass, TileGeometry, Tunnels};
    use crate::network::DirectionUpdate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use ColorClass::{Boundary as B, Walkable as O};

    const X: ColorClass = ColorClass::Wall(0);

    fn grid_from_rows<const W: usize>(rows: &[[ColorClass; W]]) -> Grid {
        let colors = (0..W)
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
                right: TileCoord::new(W - 1, 1),
            },
        )
    }

    // A corridor along row 1 with a single branch down at column 4.
    fn branching_corridor() -> Grid {
        grid_from_rows(&[
            [B, B, B, B, B, B, B],
            [B, O, O, O, O, O, B],
            [B, X, X, X, O, X, B],
            [B, X, X, X, O, X, B],
            [B, B, B, B, B, B, B],
        ])
    }

    fn ghost(grid: &Grid, col: usize, row: usize, variant: GhostVariant, external: bool) -> Ghost {
        let options = GhostOptions {
            start: TileCoord::new(col, row),
            size: Size::new(30, 30),
            color: "pink".to_string(),
            speed: 10,
            variant,
        };
        Ghost::spawn(&options, grid, external)
    }

    fn body_on(col: i32, row: i32) -> Body {
        Body::new(Point::new(30 + col * 30, 30 + row * 30), Size::new(30, 30))
    }

    #[test]
    fn corridor_is_followed_until_the_first_branch() {
        let grid = branching_corridor();
        let motion = MotionController::new(&grid);
        let mut rng = StdRng::seed_from_u64(7);
        let player = body_on(4, 3);
        let inbox = Inbox::default();

        let mut ghost = ghost(&grid, 1, 1, GhostVariant::Pursuer, false);
        ghost.actor.commit(Direction::Right);

        for _ in 0..9 {
            ghost.update(&motion, &grid, &player, &inbox, &mut rng);
            assert_eq!(ghost.replans(), 0);
        }
        assert_eq!(ghost.actor.body.center, Point::new(150, 60));

        ghost.update(&motion, &grid, &player, &inbox, &mut rng);
        assert_eq!(ghost.replans(), 1);
        assert_eq!(ghost.actor.moves.current, Direction::Down);
        assert_eq!(ghost.actor.body.center, Point::new(150, 70));
        assert_eq!(ghost.state(), GhostState::FollowingDirection);
    }

    #[test]
    fn dead_end_triggers_a_replan_towards_the_target() {
        let grid = branching_corridor();
        let motion = MotionController::new(&grid);
        let mut rng = StdRng::seed_from_u64(1);
        let mut ghost = ghost(&grid, 1, 1, GhostVariant::Pursuer, false);

        // Facing the boundary on the left, the player is to the right.
        ghost.update_local(&motion, &grid, &body_on(5, 1), &mut rng);
        assert_eq!(ghost.replans(), 1);
        assert_eq!(ghost.actor.moves.current, Direction::Right);
        assert_eq!(ghost.actor.body.center, Point::new(70, 60));
    }

    #[test]
    fn unreachable_target_falls_back_to_random() {
        let grid = grid_from_rows(&[
            [B, B, B, B, B],
            [B, O, X, O, B],
            [B, B, B, B, B],
        ]);
        let motion = MotionController::new(&grid);
        let mut rng = StdRng::seed_from_u64(3);
        let mut ghost = ghost(&grid, 1, 1, GhostVariant::Roamer, false);

        ghost.update_local(&motion, &grid, &body_on(3, 1), &mut rng);
        assert_eq!(ghost.replans(), 1);
        assert_eq!(ghost.actor.moves.current, ghost.idle_direction);
        assert_eq!(ghost.actor.moves.waiting, ghost.idle_direction);
    }

    #[test]
    fn steps_between_tiles_map_to_directions() {
        let at = TileCoord::new(3, 3);
        assert_eq!(direction_towards(at, TileCoord::new(2, 3)), Direction::Left);
        assert_eq!(direction_towards(at, TileCoord::new(4, 3)), Direction::Right);
        assert_eq!(direction_towards(at, TileCoord::new(3, 2)), Direction::Up);
        assert_eq!(direction_towards(at, TileCoord::new(3, 4)), Direction::Down);
    }

    #[test]
    fn external_ghost_follows_its_color() {
        let grid = branching_corridor();
        let motion = MotionController::new(&grid);
        let mut ghost = ghost(&grid, 4, 1, GhostVariant::Pursuer, true);
        let mut inbox = Inbox::default();
        inbox.absorb_updates(vec![
            DirectionUpdate {
                color: "cyan".to_string(),
                direction: Direction::Up,
            },
            DirectionUpdate {
                color: "pink".to_string(),
                direction: Direction::Down,
            },
        ]);

        ghost.update_external(&motion, &grid, &inbox);
        assert_eq!(ghost.actor.body.center, Point::new(150, 70));
        assert_eq!(ghost.actor.moves.current, Direction::Down);
        assert_eq!(ghost.state(), GhostState::ExternallyDriven);
    }

    #[test]
    fn blocked_external_request_keeps_the_committed_direction() {
        let grid = branching_corridor();
        let motion = MotionController::new(&grid);
        let mut ghost = ghost(&grid, 2, 1, GhostVariant::Pursuer, true);
        ghost.actor.commit(Direction::Right);
        let mut inbox = Inbox::default();
        inbox.absorb_updates(vec![DirectionUpdate {
            color: "pink".to_string(),
            direction: Direction::Up,
        }]);

        ghost.update_external(&motion, &grid, &inbox);
        assert_eq!(ghost.actor.body.center, Point::new(100, 60));
        assert_eq!(ghost.actor.moves.current, Direction::Right);
        assert_eq!(ghost.actor.moves.waiting, Direction::Up);
    }

    #[test]
    fn remote_ghost_never_stalls_against_a_wall() {
        let grid = grid_from_rows(&[
            [B, B, B, B, B],
            [B, O, O, O, B],
            [B, B, B, B, B],
        ]);
        let motion = MotionController::new(&grid);
        let mut ghost = ghost(&grid, 1, 1, GhostVariant::Pursuer, true);
        let mut inbox = Inbox::default();
        inbox.absorb_updates(vec![DirectionUpdate {
            color: "pink".to_string(),
            direction: Direction::Up,
        }]);

        // Both the request and the committed direction are walled off.
        ghost.update_external(&motion, &grid, &inbox);
        assert_eq!(ghost.actor.body.center, Point::new(50, 60));
        assert_eq!(ghost.actor.moves.current, Direction::Left);
    }

    #[test]
    fn pursuer_without_a_path_steps_in_a_fresh_random_direction() {
        let grid = grid_from_rows(&[
            [B, B, B, B, B],
            [B, O, X, O, B],
            [B, B, B, B, B],
        ]);
        let motion = MotionController::new(&grid);
        let expected = Direction::random(&mut StdRng::seed_from_u64(9));
        let mut rng = StdRng::seed_from_u64(9);
        let mut ghost = ghost(&grid, 1, 1, GhostVariant::Pursuer, false);

        ghost.update_local(&motion, &grid, &body_on(3, 1), &mut rng);
        let (dx, dy) = expected.delta(10);
        assert_eq!(ghost.replans(), 1);
        assert_eq!(ghost.actor.moves.current, expected);
        assert_eq!(ghost.actor.body.center, Point::new(60 + dx, 60 + dy));
    }

    #[test]
    fn ghost_on_the_target_tile_falls_back_to_random() {
        let grid = branching_corridor();
        let motion = MotionController::new(&grid);
        let expected = Direction::random(&mut StdRng::seed_from_u64(4));
        let mut rng = StdRng::seed_from_u64(4);
        let mut ghost = ghost(&grid, 1, 1, GhostVariant::Pursuer, false);

        // Facing the boundary while sharing the player's tile.
        ghost.update_local(&motion, &grid, &body_on(1, 1), &mut rng);
        assert_eq!(ghost.replans(), 1);
        assert_eq!(ghost.actor.moves.current, expected);
    }

    #[test]
    fn roamer_prefers_the_path_over_its_idle_sample() {
        let grid = branching_corridor();
        let motion = MotionController::new(&grid);
        let seed = (0..64)
            .find(|&seed| Direction::random(&mut StdRng::seed_from_u64(seed)) != Direction::Down)
            .unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut ghost = ghost(&grid, 4, 1, GhostVariant::Roamer, false);
        ghost.actor.commit(Direction::Right);

        ghost.update_local(&motion, &grid, &body_on(4, 3), &mut rng);
        assert_ne!(ghost.idle_direction, Direction::Down);
        assert_eq!(ghost.replans(), 1);
        assert_eq!(ghost.actor.moves.current, Direction::Down);
        assert_eq!(ghost.actor.body.center, Point::new(150, 70));
    }
}
