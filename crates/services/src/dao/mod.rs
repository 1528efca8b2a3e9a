pub mod attendance;
pub mod base;
pub mod member;
pub mod role;
pub mod stream_config;

pub use base::BaseDao;
