mod query_term;
mod query;

pub use query_term::*;
pub use query::*;
