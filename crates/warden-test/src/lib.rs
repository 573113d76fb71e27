#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for in-memory store operations.
pub const TRACING_TARGET_MEMORY: &str = "warden_test::memory";

mod memory;

pub use memory::MemoryUserStore;
