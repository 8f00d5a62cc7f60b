mod course;
mod document;
mod goal;
mod message;
mod session;
mod user;

pub use course::*;
pub use document::*;
pub use goal::*;
pub use message::*;
pub use session::*;
pub use user::*;
