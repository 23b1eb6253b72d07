// Domain entities and views

pub mod gym;
pub mod request;
pub mod user;

pub use gym::*;
pub use request::*;
pub use user::*;
