pub mod embeddings;
pub mod filesystem;
pub mod sqlite;
