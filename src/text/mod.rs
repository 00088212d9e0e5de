pub mod normalize;
pub mod title;

pub use normalize::normalize;
pub use title::{
    PLACEHOLDER_TITLE, TITLE_MARKER, format_summary, next_sequence, rederive_summary,
    sanitize_title, title_segment,
};
