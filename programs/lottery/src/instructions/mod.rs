pub mod check_upkeep;
pub mod enter;
pub mod fulfill_randomness;
pub mod initialize;
pub mod perform_upkeep;
pub mod queries;

pub use check_upkeep::*;
pub use enter::*;
pub use fulfill_randomness::*;
pub use initialize::*;
pub use perform_upkeep::*;
pub use queries::*;
