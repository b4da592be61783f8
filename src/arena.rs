//! Growable storage made of fixed capacity blocks
//!
//! Blocks are never released while the arena is alive, `clear` only resets
//! the length so the next path reuses memory allocated by previous ones.
use crate::Error;
use std::ops::Index;

pub struct BlockArena<T> {
    blocks: Vec<Vec<T>>,
    block_capacity: usize,
    len: usize,
}

impl<T: Copy + Default> BlockArena<T> {
    pub fn new(block_capacity: usize) -> Self {
        Self {
            blocks: Vec::new(),
            block_capacity: block_capacity.max(1),
            len: 0,
        }
    }

    /// Number of stored elements
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of allocated blocks (including the ones unused since last `clear`)
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    pub fn block_capacity(&self) -> usize {
        self.block_capacity
    }

    /// Total number of elements that fit without allocation
    pub fn capacity(&self) -> usize {
        self.blocks.len() * self.block_capacity
    }

    /// Forget all elements, keeping allocated blocks
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Append value, allocating a new block if all existing ones are full
    ///
    /// On allocation failure the arena is left unchanged.
    pub fn push(&mut self, value: T) -> Result<(), Error> {
        let block = self.len / self.block_capacity;
        if block >= self.blocks.len() {
            self.grow()?;
        }
        self.blocks[block][self.len % self.block_capacity] = value;
        self.len += 1;
        Ok(())
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        Some(&self.blocks[index / self.block_capacity][index % self.block_capacity])
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.blocks.iter().flatten().take(self.len)
    }

    fn grow(&mut self) -> Result<(), Error> {
        let out_of_memory = |requested| Error::OutOfMemory {
            what: "cell block",
            requested,
        };
        self.blocks
            .try_reserve(1)
            .map_err(|_| out_of_memory(self.blocks.len() + 1))?;
        let mut block = Vec::new();
        block
            .try_reserve_exact(self.block_capacity)
            .map_err(|_| out_of_memory(self.block_capacity))?;
        block.resize(self.block_capacity, T::default());
        self.blocks.push(block);
        tracing::debug!(
            "[arena] allocated block {} ({} elements each)",
            self.blocks.len(),
            self.block_capacity
        );
        Ok(())
    }
}

impl<T: Copy + Default> Index<usize> for BlockArena<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        assert!(index < self.len, "arena index {} out of {}", index, self.len);
        &self.blocks[index / self.block_capacity][index % self.block_capacity]
    }
}
