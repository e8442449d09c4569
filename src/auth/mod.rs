pub mod admins;
pub mod session;

pub use admins::authenticate;
