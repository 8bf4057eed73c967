pub mod hashing;
pub mod lazy;
pub mod openai;
pub mod voyage;
