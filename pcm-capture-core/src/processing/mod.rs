pub mod period_buffer;
pub mod ring_store;
