//! Data models for attendance tracking

pub mod attendance;
pub mod office;
pub mod report;
pub mod user;

// Re-export commonly used types
pub use attendance::{AttendanceSession, SessionStatus, SessionView};
pub use office::{Office, OfficeShort};
pub use report::AttendanceStatistics;
pub use user::{Role, UserClaims};
