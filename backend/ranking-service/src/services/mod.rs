pub mod pagination;
pub mod random_pick;
pub mod scoring;

pub use pagination::{list_items, Cursor, MoreLink, Page, PageSource};
pub use random_pick::{pick_random, pick_random_with};
pub use scoring::{rank, rank_fields, score};
