pub mod broker;
pub mod config;
pub mod error;
pub mod frame_queue;
pub mod geometry;
pub mod ingest;
pub mod io;
pub mod marker;
pub mod render;
pub mod scene;
pub mod viewer;

pub use error::{ConnectionError, DecodeError, DrawError, Error};
pub use marker::{MarkerFrame, MarkerRecord};
