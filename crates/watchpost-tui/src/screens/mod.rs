//! Screen implementations. Each activity is a top-level Component.

mod list;
mod live;

pub use list::ListScreen;
pub use live::{LAYOUTS, LiveScreen};
