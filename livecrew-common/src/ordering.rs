//! Dense ordering planner
//!
//! Segments and title definitions keep a 1-based, gap-free `sort_order`
//! within their production. The planner works on the full sibling set read
//! inside the caller's transaction and returns every row that has to move;
//! [`crate::db::ordered::OrderedTable`] applies the plan without ever
//! letting two live rows share a `(production_id, sort_order)` pair.
//!
//! Out-of-range positions are clamped, not rejected: inserting at 99 into a
//! list of 4 appends at 5, moving to 99 moves to the end.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Minimum distance rows are parked away from the live range during a shift
pub const BUMP_OFFSET: i64 = 1000;

/// A validated 1-based list position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Position(i64);

impl Position {
    /// Validate a raw position (must be >= 1)
    pub fn new(value: i64) -> Result<Self> {
        if value < 1 {
            return Err(Error::InvalidInput(format!(
                "position must be a positive integer, got {}",
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for Position {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        Position::new(value)
    }
}

impl From<Position> for i64 {
    fn from(position: Position) -> i64 {
        position.0
    }
}

/// Current position of one row in a group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub id: i64,
    pub order: i64,
}

/// A sibling row that changes position as a side effect of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
    pub id: i64,
    pub from: i64,
    pub to: i64,
}

impl Shift {
    /// +1 when the row moves later in the list, -1 when it moves earlier
    pub fn direction(&self) -> i64 {
        (self.to - self.from).signum()
    }

    /// Value the row holds between the two phases of a bump
    pub fn staged(&self, offset: i64) -> i64 {
        self.from + self.direction() * offset
    }
}

/// Result of planning an insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertPlan {
    /// Final position of the new row
    pub position: i64,
    /// Existing rows pushed one slot later, ascending by current order
    pub shifts: Vec<Shift>,
    pub offset: i64,
}

/// Result of planning a move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    pub id: i64,
    pub from: i64,
    pub to: i64,
    /// Rows between `from` and `to`, each moving one slot toward `from`
    pub shifts: Vec<Shift>,
    pub offset: i64,
}

impl MovePlan {
    /// True when the row already sits at the target position
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// Result of planning a delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePlan {
    pub id: i64,
    /// Survivors whose order changes, ascending; every entry moves earlier
    pub renumber: Vec<Shift>,
}

fn max_order(siblings: &[Slot]) -> i64 {
    siblings.iter().map(|s| s.order).max().unwrap_or(0)
}

/// Offset large enough that `order + offset` clears every live row
pub fn bump_offset(siblings: &[Slot]) -> i64 {
    BUMP_OFFSET.max(max_order(siblings) + 2)
}

fn sorted(siblings: &[Slot]) -> Vec<Slot> {
    let mut slots = siblings.to_vec();
    slots.sort_by_key(|s| (s.order, s.id));
    slots
}

fn find(siblings: &[Slot], id: i64) -> Result<Slot> {
    siblings
        .iter()
        .copied()
        .find(|s| s.id == id)
        .ok_or_else(|| Error::NotFound(format!("item {} is not part of this group", id)))
}

/// Plan inserting a new row at `desired` (append when `None`)
pub fn plan_insert(siblings: &[Slot], desired: Option<Position>) -> InsertPlan {
    let max = max_order(siblings);
    let position = desired.map_or(max + 1, |p| p.get().min(max + 1));

    let shifts = sorted(siblings)
        .into_iter()
        .filter(|s| s.order >= position)
        .map(|s| Shift {
            id: s.id,
            from: s.order,
            to: s.order + 1,
        })
        .collect();

    InsertPlan {
        position,
        shifts,
        offset: bump_offset(siblings),
    }
}

/// Plan moving row `id` to `target`
pub fn plan_move(siblings: &[Slot], id: i64, target: Position) -> Result<MovePlan> {
    let subject = find(siblings, id)?;
    let from = subject.order;
    let to = target.get().min(max_order(siblings));

    let shifts = if to < from {
        sorted(siblings)
            .into_iter()
            .filter(|s| s.id != id && s.order >= to && s.order < from)
            .map(|s| Shift {
                id: s.id,
                from: s.order,
                to: s.order + 1,
            })
            .collect()
    } else if to > from {
        sorted(siblings)
            .into_iter()
            .filter(|s| s.id != id && s.order > from && s.order <= to)
            .map(|s| Shift {
                id: s.id,
                from: s.order,
                to: s.order - 1,
            })
            .collect()
    } else {
        Vec::new()
    };

    Ok(MovePlan {
        id,
        from,
        to,
        shifts,
        offset: bump_offset(siblings),
    })
}

/// Plan deleting row `id` and closing the gap it leaves
pub fn plan_delete(siblings: &[Slot], id: i64) -> Result<DeletePlan> {
    find(siblings, id)?;

    let renumber = sorted(siblings)
        .into_iter()
        .filter(|s| s.id != id)
        .zip(1..)
        .filter(|(s, target)| s.order != *target)
        .map(|(s, target)| Shift {
            id: s.id,
            from: s.order,
            to: target,
        })
        .collect();

    Ok(DeletePlan { id, renumber })
}

/// True when the orders are exactly `1..=N`
pub fn is_dense(siblings: &[Slot]) -> bool {
    let mut orders: Vec<i64> = siblings.iter().map(|s| s.order).collect();
    orders.sort_unstable();
    orders.iter().copied().eq(1..=orders.len() as i64)
}
