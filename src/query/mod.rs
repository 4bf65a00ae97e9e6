//! Query types and search execution

mod boolean;
mod clause;
mod collector;
mod docset;
mod explanation;
mod scorer;
mod term;
mod traits;

pub use boolean::*;
pub use clause::*;
pub use collector::*;
pub use docset::*;
pub use explanation::*;
pub use scorer::*;
pub use term::*;
pub use traits::*;
