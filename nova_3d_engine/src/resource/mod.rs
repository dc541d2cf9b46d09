/// Resource module - batched GPU resource allocation

pub mod request_queue;

pub use request_queue::*;
