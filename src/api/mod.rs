pub mod attendance;
pub mod error;
pub mod holiday;
pub mod leave_request;
pub mod timeline;
