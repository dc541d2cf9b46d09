/// Utility types shared across the engine

pub mod background_worker;

pub use background_worker::*;
