pub mod filter;
pub mod view;

pub use filter::{range_expressions, DateRange, NumericRange};
pub use view::{FilterSpec, ItemQuery};
