pub use path::*;
pub use streak::*;

mod path;
mod streak;
