pub mod money;
pub mod split;

pub use money::Money;
pub use split::{split, split_evenly, PersonShare, SplitError, SplitItem, SplitRequest};
