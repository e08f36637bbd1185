//! Database repositories module
//!
//! One repository per table, all issuing their queries through the
//! request-scoped backend handle

pub mod event;
pub mod profile;
pub mod resource;
pub mod tag;

// Re-export repositories
pub use event::EventRepository;
pub use profile::ProfileRepository;
pub use resource::ResourceRepository;
pub use tag::TagRepository;
