//! Read-only chain ancestry access for retarget computations.
//!
//! The retargeters never own chain state; they borrow it through
//! [`ChainView`], which the host's chain-index component implements over
//! whatever structure it maintains. [`HeightIndexedView`] is the reference
//! implementation over a height-indexed array.

/// Block metadata needed for retarget computations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockMetadata {
    /// Block height.
    pub height: u32,
    /// Block timestamp in Unix seconds. Signed: timestamps may run backwards
    /// relative to ancestors within the limits the header rules allow.
    pub timestamp: i64,
    /// Compact target this block was mined against (nBits).
    pub bits: u32,
}

/// Read-only view of one chain's ancestry.
///
/// A view represents a single chain ending at some tip. `ancestor` must
/// resolve every height from 0 to the tip; returning `None` for an in-range
/// height means the host's chain index is inconsistent, and the retargeters
/// treat it as a fatal error rather than computing a wrong target.
///
/// The host must keep the traversed height range stable (no reorg of those
/// entries) while a retarget call is in flight.
pub trait ChainView {
    /// Metadata of the block at `height` on this chain.
    fn ancestor(&self, height: u32) -> Option<BlockMetadata>;

    /// Metadata of the block preceding `block`, or `None` at genesis.
    fn previous(&self, block: &BlockMetadata) -> Option<BlockMetadata> {
        block.height.checked_sub(1).and_then(|h| self.ancestor(h))
    }
}

/// Height-indexed in-memory chain view.
///
/// Stores blocks in a `Vec` indexed by height, giving O(1) ancestor lookup.
/// Suitable as the backing view for tests and for hosts that keep the active
/// chain in a contiguous arena.
#[derive(Debug, Clone, Default)]
pub struct HeightIndexedView {
    blocks: Vec<BlockMetadata>,
}

impl HeightIndexedView {
    /// Create an empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block at the next height and return its metadata.
    pub fn append(&mut self, timestamp: i64, bits: u32) -> BlockMetadata {
        let block = BlockMetadata {
            height: self.blocks.len() as u32,
            timestamp,
            bits,
        };
        self.blocks.push(block);
        block
    }

    /// Metadata of the highest block, or `None` if the view is empty.
    pub fn tip(&self) -> Option<BlockMetadata> {
        self.blocks.last().copied()
    }

    /// Number of blocks in the view.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the view holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl ChainView for HeightIndexedView {
    fn ancestor(&self, height: u32) -> Option<BlockMetadata> {
        self.blocks.get(height as usize).copied()
    }
}
