mod event;
mod feedback;
mod notification_log;
mod profile;
mod registration;
mod user;
mod venue;

pub use event::*;
pub use feedback::*;
pub use notification_log::*;
pub use profile::*;
pub use registration::*;
pub use user::*;
pub use venue::*;
