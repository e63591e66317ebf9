//! Memory primitives: the bump arena and the handle-indexed pool.

mod arena;
mod handle;
mod pool;

pub use arena::{Arena, ArenaBlock, DEFAULT_ALIGNMENT};
pub use handle::PoolHandle;
pub use pool::Pool;
