pub mod collection;
pub mod record;
pub mod search_hit;
