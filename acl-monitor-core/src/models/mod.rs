// Pipeline data models

pub mod feedback;
pub mod landmark;
pub mod risk;
pub mod session;

pub use feedback::*;
pub use landmark::*;
pub use risk::*;
pub use session::*;
