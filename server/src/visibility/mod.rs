mod visibility_index;

pub use visibility_index::{PairState, VisibilityIndex};
