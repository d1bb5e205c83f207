pub mod memory;

pub use memory::InMemoryContentStore;
