// Keeps an embedded native control's visible shape in step with the toolkit
// tree around it.
//
// The native peer knows nothing about the toolkit's clipping or z-order, so
// `peer::EmbeddedPeer` computes the area it may show and masks it. While a
// capture is active (toolkit content has to appear over the peer and masking
// can't express it), the area is instead faked with a screenshot overlay.
// All of it runs on one UI thread; `handle::PeerHandle` is the way in from
// anywhere else.

pub mod capture;
pub mod config;
pub mod draw;
pub mod error;
pub mod handle;
pub mod mask;
pub mod peer;
pub mod platform;
pub mod region;
pub mod scene;
pub mod surface;
pub mod types;
pub mod ui_thread;

pub use config::{EmbedOptions, Filiation};
pub use error::{CaptureError, Error};
pub use handle::{Embedding, PeerHandle};
pub use peer::EmbeddedPeer;
pub use region::Region;
pub use types::{FrameBuffer, Point, Rect, Size};
