#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod protocol;

mod config;
pub use config::*;

#[cfg(feature = "alloc")]
mod buffer;
#[cfg(feature = "alloc")]
pub use buffer::*;

#[cfg(feature = "alloc")]
mod report;
#[cfg(feature = "alloc")]
pub use report::*;

#[cfg(feature = "alloc")]
pub mod stitch;

#[cfg(feature = "alloc")]
mod dispatch;
#[cfg(feature = "alloc")]
pub use dispatch::*;

#[cfg(feature = "alloc")]
mod ingest;
#[cfg(feature = "alloc")]
pub use ingest::*;

#[cfg(feature = "alloc")]
mod decoder;
#[cfg(feature = "alloc")]
pub use decoder::*;

#[cfg(feature = "std")]
mod turn;
#[cfg(feature = "std")]
pub use turn::*;

#[cfg(feature = "std")]
mod pipeline;
#[cfg(feature = "std")]
pub use pipeline::*;

/// Re-export to allow using [Pipeline] and [Decoder] with [std::io] streams.
#[cfg(feature = "std")]
pub use embedded_io_adapters::std::FromStd;
