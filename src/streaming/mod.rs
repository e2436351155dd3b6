//! 流式响应解码：把 SSE 字节流变成类型化的结果序列。
//!
//! [`decode::SseFramer`] turns raw body chunks into frame payloads, and
//! [`EventStream`] parses each payload into the caller's update type, one pull at a time.

pub mod decode;
pub mod event_stream;

pub use decode::{Frame, SseFramer, DONE_SENTINEL};
pub use event_stream::{DecoderOptions, EventStream};
