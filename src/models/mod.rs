pub mod check_in;
pub mod garden;
pub mod plant;
pub mod user;

pub use check_in::*;
pub use garden::*;
pub use plant::*;
pub use user::*;
