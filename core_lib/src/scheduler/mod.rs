//! Scheduled-posts table consumer

pub mod render;
pub mod table;

pub use render::{render_posts, render_row, PLACEHOLDER};
pub use table::{SchedulerAction, SchedulerTable, TableContainer, POSTS_KEY};
