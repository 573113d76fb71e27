#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod service;
mod utility;

pub use warden_core::{BoxedError, Error, ErrorKind, Result};
