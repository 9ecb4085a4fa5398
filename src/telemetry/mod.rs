pub mod refresh;
pub mod ride;
