pub mod build;
pub mod extract;
pub mod node;

pub use build::{DEFAULT_CODE_LANGUAGE, from_plain_text, with_code_block};
pub use extract::{collect_links, extract_code_blocks, extract_tables, has_media, to_text};
pub use node::{Mark, Node};
