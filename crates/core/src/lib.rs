pub mod calendar;
pub mod error;
pub mod memo;
pub mod record;
pub mod roles;
pub mod session;
pub mod types;
pub mod util;
