//! Controller input display core.
//!
//! Raw frames from a retro controller adapter are decoded into named
//! button/analog readings, cleaned up by a three-frame noise filter and
//! diffed into per-input press/release histories. The histories answer the
//! questions an on-screen display asks every frame: is it held, for how
//! long, how fast is it being mashed, and where do the press bars sit on
//! the scrolling timeline.
//!
//! ```text
//! FrameReader -> Decoder -> NoiseFilter -> InputTable -> build_segments
//! ```
//! [`pipeline::Session`] wires one source through all of it.

pub mod config;
pub mod decode;
pub mod dispatch;
pub mod error;
pub mod filter;
pub mod history;
pub mod pipeline;
pub mod smoothing;
pub mod source;
pub mod state;
pub mod timeline;

pub use decode::Decoder;
pub use error::RetroviewError;
pub use pipeline::{InputView, Session};
pub use state::{Analog, ControllerState, ControllerStateBuilder};
