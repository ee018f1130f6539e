//! Core library modules for mediafire-dl
//!
//! This module contains the internal implementation details of the mediafire-dl library.

pub mod error;
pub mod format;
pub mod progress;
pub mod resolver;
pub mod stream;
pub mod downloader;

// Re-export main types for internal use
pub use downloader::Downloader;
pub use resolver::{Resolver, ResolverConfig};
