pub mod fanout;
pub mod fetch;

pub use fanout::{search_many, FanOutReport, FanOutSummary, SiteSearchResult};
pub use fetch::{fetch_page, Page};
