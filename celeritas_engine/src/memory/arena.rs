//! Bump arena over a fixed byte buffer.
//!
//! Allocation advances a cursor; individual blocks are never freed. The only
//! release operation is [`Arena::free_all`], which rewinds the cursor in O(1).
//!
//! Blocks are identified by [`ArenaBlock`] (offset + size) rather than by
//! reference, so the arena can keep handing out blocks while earlier ones are
//! still in use. Accessing a block after `free_all` is reported as an error.
//!
//! # Example
//!
//! ```
//! use celeritas_engine::memory::Arena;
//!
//! let mut arena = Arena::new(256);
//! let block = arena.alloc(64)?;
//! arena.bytes_mut(block)?[0] = 7;
//! assert_eq!(arena.bytes(block)?[0], 7);
//! arena.free_all();
//! assert_eq!(arena.used(), 0);
//! # Ok::<(), celeritas_engine::celeritas::Error>(())
//! ```

use std::ops::Range;

use crate::error::{Error, Result};

/// Alignment used by [`Arena::alloc`]: two machine words.
pub const DEFAULT_ALIGNMENT: usize = 2 * std::mem::size_of::<usize>();

/// A region handed out by an [`Arena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaBlock {
    offset: usize,
    size: usize,
}

impl ArenaBlock {
    /// Byte offset from the start of the arena buffer
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.size
    }
}

pub struct Arena {
    buffer: Box<[u8]>,
    cursor: usize,
}

impl Arena {
    /// Create an arena owning a zeroed buffer of `capacity` bytes
    pub fn new(capacity: usize) -> Self {
        Self::from_buffer(vec![0u8; capacity].into_boxed_slice())
    }

    /// Wrap a caller-provided buffer. The cursor starts at 0.
    pub fn from_buffer(buffer: Box<[u8]>) -> Self {
        Self { buffer, cursor: 0 }
    }

    /// Allocate `size` bytes at [`DEFAULT_ALIGNMENT`]
    pub fn alloc(&mut self, size: usize) -> Result<ArenaBlock> {
        self.alloc_align(size, DEFAULT_ALIGNMENT)
    }

    /// Allocate `size` zeroed bytes whose address is a multiple of `align`.
    ///
    /// Padding is computed from the real address of the cursor, not from the
    /// offset, so alignment holds for any backing buffer.
    ///
    /// # Errors
    ///
    /// - `InvalidResource` if `align` is not a power of two
    /// - `ArenaExhausted` if padding plus `size` exceeds the remaining space;
    ///   the cursor is left untouched
    pub fn alloc_align(&mut self, size: usize, align: usize) -> Result<ArenaBlock> {
        if !align.is_power_of_two() {
            crate::engine_fail!(
                "celeritas::Arena",
                Error::InvalidResource(format!("alignment {} is not a power of two", align))
            );
        }

        let current = self.buffer.as_ptr() as usize + self.cursor;
        let padding = current.wrapping_neg() & (align - 1);
        let available = self.remaining();

        if padding.saturating_add(size) > available {
            crate::engine_fail!(
                "celeritas::Arena",
                Error::ArenaExhausted { requested: padding.saturating_add(size), available }
            );
        }

        let block = ArenaBlock { offset: self.cursor + padding, size };
        self.buffer[block.range()].fill(0);
        self.cursor = block.offset + size;
        Ok(block)
    }

    /// Allocate a block and copy `data` into it
    pub fn push_bytes(&mut self, data: &[u8], align: usize) -> Result<ArenaBlock> {
        let block = self.alloc_align(data.len(), align)?;
        self.buffer[block.range()].copy_from_slice(data);
        Ok(block)
    }

    /// Read access to a live block
    ///
    /// # Errors
    ///
    /// `InvalidResource` if the block lies beyond the cursor (it was handed
    /// out before the last `free_all`, or by another arena).
    pub fn bytes(&self, block: ArenaBlock) -> Result<&[u8]> {
        self.check_live(block)?;
        Ok(&self.buffer[block.range()])
    }

    /// Write access to a live block
    pub fn bytes_mut(&mut self, block: ArenaBlock) -> Result<&mut [u8]> {
        self.check_live(block)?;
        Ok(&mut self.buffer[block.range()])
    }

    /// Release every block at once
    pub fn free_all(&mut self) {
        self.cursor = 0;
    }

    /// Bytes consumed so far, padding included
    pub fn used(&self) -> usize {
        self.cursor
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.cursor
    }

    fn check_live(&self, block: ArenaBlock) -> Result<()> {
        if block.offset + block.size > self.cursor {
            return Err(Error::InvalidResource(format!(
                "arena block at {}..{} is past the cursor ({})",
                block.offset,
                block.offset + block.size,
                self.cursor
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "arena_tests.rs"]
mod tests;
