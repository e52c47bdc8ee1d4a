//! Blocks and the solution area they are placed into.
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identifier unique within one level's block set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a block currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    #[default]
    Unplaced,
    Slot(u8),
}

impl Placement {
    #[must_use]
    pub const fn is_placed(self) -> bool {
        matches!(self, Self::Slot(_))
    }

    #[must_use]
    pub const fn slot(self) -> Option<u8> {
        match self {
            Self::Slot(slot) => Some(slot),
            Self::Unplaced => None,
        }
    }
}

/// A numbered tile the player can move into the solution area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub value: u32,
    #[serde(default)]
    pub placement: Placement,
}

impl Block {
    #[must_use]
    pub const fn new(id: BlockId, value: u32) -> Self {
        Self {
            id,
            value,
            placement: Placement::Unplaced,
        }
    }

    #[must_use]
    pub const fn is_placed(&self) -> bool {
        self.placement.is_placed()
    }
}

/// Reasons a placement request cannot be applied.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PlacementError {
    #[error("no block {0} in the current level")]
    UnknownBlock(BlockId),
    #[error("slot {slot} is outside the solution area ({slot_count} slots)")]
    SlotOutOfRange { slot: u8, slot_count: u8 },
    #[error("block {block} already occupies slot {slot}")]
    AlreadyInSlot { block: BlockId, slot: u8 },
    #[error("block {0} is not placed")]
    NotPlaced(BlockId),
}

/// Effect of a successful placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementChange {
    pub block: BlockId,
    pub slot: u8,
    /// Previous occupant of `slot`, now unplaced.
    pub evicted: Option<BlockId>,
    /// Slot the moved block left, if it was already placed.
    pub vacated: Option<u8>,
}

/// Move `id` into `slot`, evicting any occupant to the unplaced pool.
///
/// # Errors
///
/// Returns `PlacementError` when the block is unknown, the slot is out of
/// range, or the block already sits in `slot`.
pub fn place_block(
    blocks: &mut [Block],
    id: BlockId,
    slot: u8,
    slot_count: u8,
) -> Result<PlacementChange, PlacementError> {
    if slot >= slot_count {
        return Err(PlacementError::SlotOutOfRange { slot, slot_count });
    }
    let index = index_of(blocks, id).ok_or(PlacementError::UnknownBlock(id))?;
    let previous = blocks[index].placement;
    if previous == Placement::Slot(slot) {
        return Err(PlacementError::AlreadyInSlot { block: id, slot });
    }

    let mut evicted = None;
    if let Some(occupant) = blocks
        .iter_mut()
        .find(|block| block.placement == Placement::Slot(slot))
    {
        occupant.placement = Placement::Unplaced;
        evicted = Some(occupant.id);
    }
    blocks[index].placement = Placement::Slot(slot);

    Ok(PlacementChange {
        block: id,
        slot,
        evicted,
        vacated: previous.slot(),
    })
}

/// Return a placed block to the unplaced pool, yielding the slot it left.
///
/// # Errors
///
/// Returns `PlacementError` when the block is unknown or not placed.
pub fn remove_block(blocks: &mut [Block], id: BlockId) -> Result<u8, PlacementError> {
    let index = index_of(blocks, id).ok_or(PlacementError::UnknownBlock(id))?;
    let slot = blocks[index]
        .placement
        .slot()
        .ok_or(PlacementError::NotPlaced(id))?;
    blocks[index].placement = Placement::Unplaced;
    Ok(slot)
}

/// Block currently occupying `slot`.
#[must_use]
pub fn occupant(blocks: &[Block], slot: u8) -> Option<&Block> {
    blocks
        .iter()
        .find(|block| block.placement == Placement::Slot(slot))
}

/// Placed blocks in slot order.
#[must_use]
pub fn placed_in_slot_order(blocks: &[Block]) -> Vec<&Block> {
    let mut placed: Vec<&Block> = blocks.iter().filter(|b| b.is_placed()).collect();
    placed.sort_by_key(|b| b.placement.slot());
    placed
}

fn index_of(blocks: &[Block], id: BlockId) -> Option<usize> {
    blocks.iter().position(|block| block.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Block> {
        [4, 7, 9, 2]
            .iter()
            .enumerate()
            .map(|(i, &v)| Block::new(BlockId(u32::try_from(i).unwrap()), v))
            .collect()
    }

    #[test]
    fn placing_into_occupied_slot_evicts_occupant() {
        let mut blocks = sample();
        place_block(&mut blocks, BlockId(0), 1, 3).unwrap();
        let change = place_block(&mut blocks, BlockId(2), 1, 3).unwrap();
        assert_eq!(change.evicted, Some(BlockId(0)));
        assert_eq!(blocks[0].placement, Placement::Unplaced);
        assert_eq!(occupant(&blocks, 1).map(|b| b.id), Some(BlockId(2)));
    }

    #[test]
    fn moving_a_block_vacates_its_old_slot() {
        let mut blocks = sample();
        place_block(&mut blocks, BlockId(1), 0, 3).unwrap();
        let change = place_block(&mut blocks, BlockId(1), 2, 3).unwrap();
        assert_eq!(change.vacated, Some(0));
        assert!(occupant(&blocks, 0).is_none());
        assert_eq!(blocks.iter().filter(|b| b.is_placed()).count(), 1);
    }

    #[test]
    fn rejects_same_slot_unknown_block_and_bad_slot() {
        let mut blocks = sample();
        place_block(&mut blocks, BlockId(3), 0, 3).unwrap();
        assert_eq!(
            place_block(&mut blocks, BlockId(3), 0, 3),
            Err(PlacementError::AlreadyInSlot {
                block: BlockId(3),
                slot: 0
            })
        );
        assert_eq!(
            place_block(&mut blocks, BlockId(99), 1, 3),
            Err(PlacementError::UnknownBlock(BlockId(99)))
        );
        assert_eq!(
            place_block(&mut blocks, BlockId(1), 3, 3),
            Err(PlacementError::SlotOutOfRange {
                slot: 3,
                slot_count: 3
            })
        );
    }

    #[test]
    fn remove_returns_block_to_pool() {
        let mut blocks = sample();
        place_block(&mut blocks, BlockId(2), 2, 3).unwrap();
        assert_eq!(remove_block(&mut blocks, BlockId(2)), Ok(2));
        assert_eq!(
            remove_block(&mut blocks, BlockId(2)),
            Err(PlacementError::NotPlaced(BlockId(2)))
        );
    }

    #[test]
    fn slot_order_listing() {
        let mut blocks = sample();
        place_block(&mut blocks, BlockId(0), 2, 3).unwrap();
        place_block(&mut blocks, BlockId(3), 0, 3).unwrap();
        let values: Vec<u32> = placed_in_slot_order(&blocks)
            .iter()
            .map(|b| b.value)
            .collect();
        assert_eq!(values, vec![2, 4]);
    }
}
