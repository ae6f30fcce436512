//! Storage backends and the seeder that drives them.

pub mod memory;
pub mod mongo;
pub mod seeder;
pub mod store;

pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use seeder::{ReportSeeding, SeedError, Seeder};
pub use store::SeedStore;
