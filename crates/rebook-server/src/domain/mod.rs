mod appointment;
mod business;
mod customer;
mod review;
mod visit;

pub use appointment::*;
pub use business::*;
pub use customer::*;
pub use review::*;
pub use visit::*;
