mod cache;
mod choghadiya;
mod grid;
mod moon;
mod session;
mod ticker;
mod time_label;
mod translate;

pub use cache::*;
pub use choghadiya::*;
pub use grid::*;
pub use moon::*;
pub use session::*;
pub use ticker::*;
pub use time_label::*;
pub use translate::*;
