use crate::errors::GridError;
use crate::geometry::GridPos;
use crate::graph_algos::space::{GoalMotion, SearchSpace};

use rand::Rng;


/// Rectangular 4-connected grid with a per-cell entry cost
/// Cells are either passable with a cost or walls. Walls are never successors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridMap {
    width: usize,
    height: usize,
    cells: Vec<Option<u32>>, // row-major, None marks a wall
    start: GridPos,
    goal: GridPos,
}

impl GridMap {

    /// Grid where every cell costs `cost`
    /// Start defaults to the top-left corner, goal to the bottom-right one
    pub fn uniform(width: usize, height: usize, cost: u32) -> Result<Self, GridError> {
        let len = cell_count(width, height)?;
        Self::from_cells(width, height, vec![Some(cost); len])
    }

    /// Build from rows of cell values, negative values are walls
    /// The default start (top-left) and goal (bottom-right) must not be walls
    pub fn from_rows<R: AsRef<[i32]>>(rows: &[R]) -> Result<Self, GridError> {
        let width = rows.first().map(|row| row.as_ref().len()).unwrap_or(0);
        for (row, values) in rows.iter().enumerate() {
            let found = values.as_ref().len();
            if found != width {
                return Err(GridError::RaggedRows { row, expected: width, found });
            }
        }

        let mut cells = Vec::with_capacity(cell_count(width, rows.len())?);
        for values in rows {
            cells.extend(values.as_ref().iter().map(|&v| u32::try_from(v).ok()));
        }

        Self::from_cells(width, rows.len(), cells)
    }

    /// Grid with costs drawn uniformly from 1..=max_cost
    pub fn random<R: Rng>(width: usize, height: usize, max_cost: u32, rng: &mut R) -> Result<Self, GridError> {
        let max_cost = max_cost.max(1);
        let cells = (0..cell_count(width, height)?)
            .map(|_| Some(rng.random_range(1..=max_cost)))
            .collect();
        Self::from_cells(width, height, cells)
    }

    fn from_cells(width: usize, height: usize, cells: Vec<Option<u32>>) -> Result<Self, GridError> {
        cell_count(width, height)?;
        // both fit in i32, checked by cell_count
        let far_corner = GridPos::new((width - 1) as i32, (height - 1) as i32);
        let grid = Self {
            width,
            height,
            cells,
            start: GridPos::new(0, 0),
            goal: far_corner,
        };
        grid.passable(grid.start)?;
        grid.passable(grid.goal)?;
        Ok(grid)
    }

    pub fn with_start(mut self, start: GridPos) -> Result<Self, GridError> {
        self.passable(start)?;
        self.start = start;
        Ok(self)
    }

    pub fn with_goal(mut self, goal: GridPos) -> Result<Self, GridError> {
        self.passable(goal)?;
        self.goal = goal;
        Ok(self)
    }

    pub fn set_cost(&mut self, pos: GridPos, cost: u32) -> Result<(), GridError> {
        let index = self.index(pos).ok_or(GridError::OutOfBounds(pos))?;
        self.cells[index] = Some(cost);
        Ok(())
    }

    /// Turn a cell into a wall, the start and goal cells cannot be walled
    pub fn set_wall(&mut self, pos: GridPos) -> Result<(), GridError> {
        let index = self.index(pos).ok_or(GridError::OutOfBounds(pos))?;
        if pos == self.start || pos == self.goal {
            return Err(GridError::Blocked(pos));
        }
        self.cells[index] = None;
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        self.index(pos).is_some()
    }

    /// Entry cost of a cell, None for walls and positions off the grid
    pub fn cost(&self, pos: GridPos) -> Option<u32> {
        self.index(pos).and_then(|i| self.cells[i])
    }

    pub fn is_wall(&self, pos: GridPos) -> bool {
        matches!(self.index(pos), Some(i) if self.cells[i].is_none())
    }

    fn passable(&self, pos: GridPos) -> Result<u32, GridError> {
        let index = self.index(pos).ok_or(GridError::OutOfBounds(pos))?;
        self.cells[index].ok_or(GridError::Blocked(pos))
    }

    fn index(&self, pos: GridPos) -> Option<usize> {
        let x = usize::try_from(pos.x).ok()?;
        let y = usize::try_from(pos.y).ok()?;
        (x < self.width && y < self.height).then_some(y * self.width + x)
    }

}

/// Number of cells in a width x height grid
/// Rejects empty grids and sizes whose coordinates or cell count do not fit
fn cell_count(width: usize, height: usize) -> Result<usize, GridError> {
    if width == 0 || height == 0 {
        return Err(GridError::EmptyGrid);
    }
    let too_large = GridError::TooLarge { width, height };
    if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
        return Err(too_large);
    }
    width.checked_mul(height).ok_or(too_large)
}

impl SearchSpace for GridMap {
    type State = GridPos;
    type Cost = u32;

    fn start_position(&self) -> GridPos {
        self.start
    }

    fn goal_position(&self) -> GridPos {
        self.goal
    }

    /// Walls and off-grid cells are effectively infinite
    fn cell_cost(&self, state: &GridPos) -> u32 {
        self.cost(*state).unwrap_or(u32::MAX)
    }

    fn successors(&self, state: &GridPos) -> Vec<GridPos> {
        state.neighbors4()
            .filter(|&p| self.cost(p).is_some())
            .collect()
    }
}


/// Goal that drifts by `step` once every `period` ticks
/// The goal is allowed to leave the grid, after which it can no longer be reached
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecedingGoal {
    position: GridPos,
    step: (i32, i32),
    period: u64,
    ticks: u64,
}

impl RecedingGoal {

    pub fn new(position: GridPos, step: (i32, i32), period: u64) -> Self {
        Self {
            position,
            step,
            period: period.max(1),
            ticks: 0,
        }
    }

    /// One cell in -x every fourth tick
    pub fn leftward(position: GridPos) -> Self {
        Self::new(position, (-1, 0), 4)
    }

    pub fn position(&self) -> GridPos {
        self.position
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl GoalMotion<GridPos> for RecedingGoal {
    fn advance_goal(&mut self) -> GridPos {
        self.ticks += 1;
        if self.ticks % self.period == 0 {
            if let Some(next) = self.position.offset(self.step.0, self.step.1) {
                self.position = next;
            }
        }
        self.position
    }
}
