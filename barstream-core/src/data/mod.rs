//! Market data: the feed trait, multi-symbol alignment and the in-memory
//! historic feed.

pub mod align;
pub mod feed;
pub mod historic;

pub use align::{align_symbols, AlignedData};
pub use feed::{DataFeed, FeedError};
pub use historic::HistoricFeed;
