//! The tick loop.
//!
//! One tick moves the player, then every ghost in order, then applies the
//! walked marking and evaluates lose and win. Nothing is interleaved: the
//! grid has a single writer and every read within a tick happens on the
//! same thread.

use log::{error, info};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::collision::{colliding, mark_walked, tile_coordinates};
use crate::components::Direction;
use crate::config::GameOptions;
use crate::error::{ConfigError, GameError};
use crate::ghost::Ghost;
use crate::level::{generate, Grid};
use crate::motion::MotionController;
use crate::network::{GameStateMessage, GhostSnapshot, Inbox, OutboundMessage, PlayerSnapshot};
use crate::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    /// Ghosts are driven locally.
    Single,
    /// Every ghost belongs to a remote player.
    Multiplayer,
    /// Local ghosts, with a game-state message produced every tick.
    Learning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameState {
    Playing,
    Win,
    Lose,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub state: GameState,
    pub outbound: Option<OutboundMessage>,
}

pub struct Game {
    options: GameOptions,
    mode: GameMode,
    grid: Grid,
    motion: MotionController,
    player: Player,
    ghosts: Vec<Ghost>,
    state: GameState,
    halted: bool,
}

impl Game {
    pub fn new(options: GameOptions, mode: GameMode, rng: &mut impl Rng) -> Result<Self, ConfigError> {
        options.validate()?;
        let grid = generate(&options.board, rng)?;
        Ok(Self::with_grid(options, grid, mode))
    }

    /// Builds a game on an existing grid. Options are trusted as given.
    pub fn with_grid(options: GameOptions, grid: Grid, mode: GameMode) -> Self {
        let externally_driven = mode == GameMode::Multiplayer;
        let ghost_count = if externally_driven {
            options
                .network
                .max_players
                .saturating_sub(1)
                .min(options.ghosts.len())
        } else {
            options.ghosts.len()
        };
        let ghosts: Vec<Ghost> = options.ghosts[..ghost_count]
            .iter()
            .map(|ghost| Ghost::spawn(ghost, &grid, externally_driven))
            .collect();
        let player = Player::spawn(&options.player, &grid);
        let motion = MotionController::new(&grid);

        info!(
            "[Game] {:?} game with {} ghosts, {} tiles to walk",
            mode,
            ghosts.len(),
            grid.walkable_remaining()
        );

        Self {
            options,
            mode,
            grid,
            motion,
            player,
            ghosts,
            state: GameState::Playing,
            halted: false,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn options(&self) -> &GameOptions {
        &self.options
    }

    /// An inbox accepting directions for this game's ghosts only.
    pub fn inbox(&self) -> Inbox {
        Inbox::for_colors(self.ghosts.iter().map(|ghost| ghost.actor.color.clone()))
    }

    /// Advances the game by one tick. Once the game is over, ticks change
    /// nothing. After a fault every further tick fails with
    /// [`GameError::Halted`].
    pub fn tick(
        &mut self,
        requested: Option<Direction>,
        inbox: &Inbox,
        rng: &mut impl Rng,
    ) -> Result<TickReport, GameError> {
        if self.halted {
            return Err(GameError::Halted);
        }
        if self.state != GameState::Playing {
            return Ok(self.report());
        }

        let left = self.player.update(&self.motion, &self.grid, requested);
        let target = self.player.actor.body;
        for ghost in &mut self.ghosts {
            ghost.update(&self.motion, &self.grid, &target, inbox, rng);
        }

        if let Some(center) = left {
            if let Err(fault) = mark_walked(&mut self.grid, center) {
                error!("[Game] {}; halting", fault);
                self.halted = true;
                return Err(fault);
            }
        }

        if self
            .ghosts
            .iter()
            .any(|ghost| colliding(&ghost.actor.body, &self.player.actor.body))
        {
            self.finish(GameState::Lose);
        }
        if self.grid.walkable_remaining() == 0 {
            self.finish(GameState::Win);
        }

        Ok(self.report())
    }

    fn finish(&mut self, state: GameState) {
        if self.state != state {
            info!("[Game] {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    fn report(&self) -> TickReport {
        let outbound = (self.mode == GameMode::Learning).then(|| self.snapshot());
        TickReport {
            state: self.state,
            outbound,
        }
    }

    /// The game-state message sent to observers. Actor tiles are looked up
    /// by each actor's top-left corner, not its center.
    pub fn snapshot(&self) -> OutboundMessage {
        let player_tile = tile_coordinates(&self.grid, self.player.actor.body.corner());
        let ghosts = self
            .ghosts
            .iter()
            .map(|ghost| {
                let tile = tile_coordinates(&self.grid, ghost.actor.body.corner());
                GhostSnapshot {
                    x: tile.map(|at| at.col),
                    y: tile.map(|at| at.row),
                }
            })
            .collect();

        OutboundMessage::GameState(GameStateMessage {
            board: self.grid.color_snapshot(&self.options.board.colors),
            player: PlayerSnapshot {
                x: player_tile.map(|at| at.col),
                y: player_tile.map(|at| at.row),
                moves: self.player.actor.moves,
            },
            ghosts,
            state: self.state,
        })
    }
}
