mod chunk;
mod chunk_pool;

pub use chunk::*;
pub use chunk_pool::*;
