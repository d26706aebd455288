//! # railing-layout
//!
//! A layout engine for parametric guardrails along a picked multi-segment
//! path. It redistributes posts over each side, offsets them from the
//! reference line, runs rails that butt or cap cleanly at every corner and
//! places bolted seat angles at posts and corners.
//!
//! The engine never touches a CAD model. It consumes points, host bounds and
//! settings and produces a [`RailingBlueprint`]: plain placement requests
//! that a host integration materializes.

pub mod blueprint;
pub mod capability;
pub mod defaults;
pub mod distance;
pub mod engine;
pub mod error;
pub mod host;
pub mod joiner;
pub mod layout;
pub mod offset;
pub mod profile;
pub mod seat;
pub mod settings;
pub mod side;
pub mod stations;

pub use blueprint::*;
pub use capability::*;
pub use defaults::*;
pub use distance::*;
pub use engine::*;
pub use error::*;
pub use host::*;
pub use joiner::*;
pub use layout::*;
pub use offset::*;
pub use profile::*;
pub use seat::*;
pub use settings::*;
pub use side::*;
pub use stations::*;
