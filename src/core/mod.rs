pub mod filter;
pub mod item;
