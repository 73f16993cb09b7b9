//! Helper functions for views
//!
//! Date labels, URL building, share links and the sidebar lists used when
//! rendering posts.

mod date;
mod list;
mod url;

pub use date::*;
pub use list::*;
pub use url::*;
