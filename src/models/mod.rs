pub mod condition;
pub mod record;

pub use condition::*;
pub use record::*;
