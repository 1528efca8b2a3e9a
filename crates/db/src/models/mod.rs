pub mod attendance;
pub mod member;
pub mod role;
pub mod stream_config;

pub use attendance::AttendanceRecord;
pub use member::Member;
pub use role::{RoleName, UserRole};
pub use stream_config::StreamConfig;
