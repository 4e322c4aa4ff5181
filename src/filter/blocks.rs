//! Sampling block partition for the coordinate particle filter.
//!
//! The process-noise indices are split into contiguous blocks, one per
//! tracked part. Each block is proposed and weighted in its own pass within
//! one filter update, which is what keeps the effective sampling dimension
//! per sub-step low in multi-part state spaces.

use smallvec::SmallVec;

use super::errors::BuildError;

/// One sampling block: the noise-vector indices belonging to a single part.
pub type Block = SmallVec<[usize; 6]>;

/// Ordered partition of noise indices into per-part blocks.
///
/// Invariants (guaranteed by construction): blocks are disjoint, contiguous,
/// equally sized, and their union is exactly `0..noise_dimension()`.
#[derive(Debug, Clone)]
pub struct SamplingBlocks {
    blocks: Vec<Block>,
    block_size: usize,
}

impl SamplingBlocks {
    /// Partition `part_count * block_size` noise indices into `part_count`
    /// contiguous blocks of `block_size` indices each.
    ///
    /// Block `i` contains `{i * block_size, ..., (i + 1) * block_size - 1}`.
    pub fn partition(part_count: usize, block_size: usize) -> Result<Self, BuildError> {
        if part_count == 0 || block_size == 0 {
            return Err(BuildError::InvalidDimension {
                part_count,
                noise_dimension: part_count * block_size,
            });
        }

        let mut blocks = Vec::with_capacity(part_count);
        for i in 0..part_count {
            let mut block = Block::new();
            for k in 0..block_size {
                block.push(i * block_size + k);
            }
            blocks.push(block);
        }

        Ok(Self { blocks, block_size })
    }

    /// Partition a total noise dimension across `part_count` parts.
    ///
    /// Fails with [`BuildError::InvalidDimension`] when the dimension is not
    /// an exact multiple of the part count.
    pub fn for_noise_dimension(
        part_count: usize,
        noise_dimension: usize,
    ) -> Result<Self, BuildError> {
        if part_count == 0 || noise_dimension == 0 || noise_dimension % part_count != 0 {
            return Err(BuildError::InvalidDimension {
                part_count,
                noise_dimension,
            });
        }
        Self::partition(part_count, noise_dimension / part_count)
    }

    /// Number of blocks (== part count).
    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True when there are no blocks. Never the case for a constructed value.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Indices per block.
    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Total noise dimension covered.
    #[inline]
    pub fn noise_dimension(&self) -> usize {
        self.blocks.len() * self.block_size
    }

    /// Iterate over the blocks in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    /// The block at `index`.
    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }
}

impl<'a> IntoIterator for &'a SamplingBlocks {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
