pub mod event;
pub mod logger;

pub use event::JournalEvent;
pub use logger::ActionJournal;
