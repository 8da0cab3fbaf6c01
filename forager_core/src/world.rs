use std::collections::BTreeSet;

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::map::{Grid, GridError, Terrain};
use crate::{Action, Direction, Position};

/// Errors from world construction and map loading.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    #[error(transparent)]
    OutOfBounds(#[from] GridError),
    #[error("cannot place a resource inside a wall at {0}")]
    ResourceInWall(Position),
    #[error("position {0} already holds a resource")]
    DuplicateResource(Position),
    #[error("map string is empty")]
    EmptyMap,
    #[error("map has zero width")]
    ZeroWidth,
    #[error("inconsistent width at row {row}: expected {expected}, found {found}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown map token `{token}` at {position}")]
    UnknownToken { token: String, position: Position },
    #[error("multiple start positions ('ST') found")]
    DuplicateStart,
    #[error("no start position ('ST') found in map")]
    MissingStart,
}

/// The static obstacle layout plus the live resource set.
///
/// The terrain is never mutated by path-finding or trip evaluation; only the
/// resource set shrinks as resources are collected, and it never regrows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct World {
    terrain: Grid<Terrain>,
    resources: BTreeSet<Position>,
}

impl World {
    /// Creates a new world of open floor with no resources.
    pub fn new(width: usize, height: usize) -> Self {
        World {
            terrain: Grid::new(width, height),
            resources: BTreeSet::new(),
        }
    }

    pub fn terrain(&self) -> &Grid<Terrain> {
        &self.terrain
    }

    /// The live resource positions, in a fixed iteration order.
    pub fn resources(&self) -> &BTreeSet<Position> {
        &self.resources
    }

    /// True when `position` is inside the grid and not a wall.
    pub fn is_open(&self, position: Position) -> bool {
        matches!(self.terrain.get(position), Some(Terrain::Floor))
    }

    /// Turns the cell at `position` into a wall. Any resource there is
    /// removed first.
    pub fn add_wall(&mut self, position: Position) -> Result<(), WorldError> {
        self.terrain.set(position, Terrain::Wall)?;
        self.resources.remove(&position);
        Ok(())
    }

    /// Places a resource on an open floor cell.
    pub fn add_resource(&mut self, position: Position) -> Result<(), WorldError> {
        match self.terrain.get(position) {
            None => {
                return Err(GridError::OutOfBounds {
                    position,
                    width: self.terrain.width(),
                    height: self.terrain.height(),
                }
                .into());
            }
            Some(Terrain::Wall) => return Err(WorldError::ResourceInWall(position)),
            Some(Terrain::Floor) => {}
        }
        if !self.resources.insert(position) {
            return Err(WorldError::DuplicateResource(position));
        }
        Ok(())
    }

    /// Removes a resource, returning whether it was present.
    pub fn remove_resource(&mut self, position: Position) -> bool {
        self.resources.remove(&position)
    }

    /// Generates a world with scattered walls and resources, deterministic
    /// per seed. The start cell (the grid center) is always left open and
    /// resource-free, and is returned alongside the world.
    pub fn random(
        width: usize,
        height: usize,
        wall_density: f64,
        resource_count: usize,
        seed: u64,
    ) -> Result<(World, Position), WorldError> {
        if height == 0 {
            return Err(WorldError::EmptyMap);
        }
        if width == 0 {
            return Err(WorldError::ZeroWidth);
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let start = Position::new(width / 2, height / 2);
        let mut world = World::new(width, height);

        let wall_density = wall_density.clamp(0.0, 1.0);
        for y in 0..height {
            for x in 0..width {
                let position = Position::new(x, y);
                if position != start && rng.random_bool(wall_density) {
                    world.terrain[position] = Terrain::Wall;
                }
            }
        }

        // Rejection-sample resource cells; give up quietly on crowded maps.
        let mut placed = 0;
        let mut attempts = 0;
        while placed < resource_count && attempts < resource_count.saturating_mul(100) {
            attempts += 1;
            let position = Position::new(rng.random_range(0..width), rng.random_range(0..height));
            if position == start || !world.is_open(position) || world.resources.contains(&position)
            {
                continue;
            }
            world.resources.insert(position);
            placed += 1;
        }

        Ok((world, start))
    }
}

/// Loads a world from a string representation of a map.
///
/// The map is one row per line of whitespace-separated tokens: `ST` the
/// start/depot cell (required, exactly once), `BL` open floor, `WL` a wall,
/// `RS` a resource. Returns the world and the start position.
pub fn load_world_from_string(map_string: &str) -> Result<(World, Position), WorldError> {
    let lines: Vec<&str> = map_string.trim().lines().collect();
    if lines.is_empty() {
        return Err(WorldError::EmptyMap);
    }

    let height = lines.len();
    let mut width = 0;
    let mut parsed_rows: Vec<Vec<&str>> = Vec::with_capacity(height);

    for (y, line) in lines.iter().enumerate() {
        let tokens: Vec<&str> = line.trim().split_whitespace().collect();
        if y == 0 {
            width = tokens.len();
            if width == 0 {
                return Err(WorldError::ZeroWidth);
            }
        } else if tokens.len() != width {
            return Err(WorldError::RaggedRow {
                row: y,
                expected: width,
                found: tokens.len(),
            });
        }
        parsed_rows.push(tokens);
    }

    let mut world = World::new(width, height);
    let mut start_position: Option<Position> = None;

    for (y, row_tokens) in parsed_rows.iter().enumerate() {
        for (x, token) in row_tokens.iter().enumerate() {
            let position = Position::new(x, y);
            match *token {
                "ST" => {
                    if start_position.is_some() {
                        return Err(WorldError::DuplicateStart);
                    }
                    start_position = Some(position);
                }
                "BL" => {}
                "WL" => world.terrain[position] = Terrain::Wall,
                "RS" => {
                    world.resources.insert(position);
                }
                unknown => {
                    return Err(WorldError::UnknownToken {
                        token: unknown.to_string(),
                        position,
                    });
                }
            }
        }
    }

    let start = start_position.ok_or(WorldError::MissingStart)?;
    Ok((world, start))
}

/// Errors raised when replaying an action against the simulator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepError {
    #[error("move {direction} from {from} leaves the grid")]
    OffGrid { from: Position, direction: Direction },
    #[error("move {direction} from {from} runs into a wall")]
    IntoWall { from: Position, direction: Direction },
    #[error("take at {0} with no resource present")]
    TakeWithoutResource(Position),
    #[error("take at {position} would exceed carry capacity {capacity}")]
    OverCapacity { position: Position, capacity: usize },
    #[error("drop at {position} away from the depot {depot}")]
    DropAwayFromDepot { position: Position, depot: Position },
}

/// Replays an action sequence against a copy of a world, enforcing the
/// solver's invariants: moves stay in bounds and off walls, `TAKE` requires
/// a live resource underfoot and spare capacity, `DROP` requires standing at
/// the depot. A correct solver's output always replays cleanly.
#[derive(Debug, Clone)]
pub struct Simulator {
    world: World,
    depot: Position,
    position: Position,
    carried: usize,
    capacity: usize,
    delivered: usize,
    steps: usize,
}

impl Simulator {
    /// Starts a replay at the depot with nothing carried.
    pub fn new(world: &World, depot: Position, capacity: usize) -> Self {
        Simulator {
            world: world.clone(),
            depot,
            position: depot,
            carried: 0,
            capacity,
            delivered: 0,
            steps: 0,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn carried(&self) -> usize {
        self.carried
    }

    /// Resources banked at the depot so far.
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    /// Actions applied so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Applies a single action, or reports the invariant it would violate.
    pub fn apply(&mut self, action: Action) -> Result<(), StepError> {
        match action {
            Action::Move(direction) => {
                let from = self.position;
                let target = from.step(direction).ok_or(StepError::OffGrid {
                    from,
                    direction,
                })?;
                match self.world.terrain().get(target) {
                    None => return Err(StepError::OffGrid { from, direction }),
                    Some(Terrain::Wall) => return Err(StepError::IntoWall { from, direction }),
                    Some(Terrain::Floor) => self.position = target,
                }
            }
            Action::Take => {
                if self.carried >= self.capacity {
                    return Err(StepError::OverCapacity {
                        position: self.position,
                        capacity: self.capacity,
                    });
                }
                if !self.world.remove_resource(self.position) {
                    return Err(StepError::TakeWithoutResource(self.position));
                }
                self.carried += 1;
            }
            Action::Drop => {
                if self.position != self.depot {
                    return Err(StepError::DropAwayFromDepot {
                        position: self.position,
                        depot: self.depot,
                    });
                }
                self.delivered += self.carried;
                self.carried = 0;
            }
        }
        self.steps += 1;
        Ok(())
    }

    /// Replays a whole sequence, stopping at the first violation.
    pub fn run(&mut self, actions: &[Action]) -> Result<(), StepError> {
        for &action in actions {
            self.apply(action)?;
        }
        Ok(())
    }
}
