mod capture_loop;
pub mod capture_session;
mod shared;
