//! Boreal engine core.
//!
//! The crate covers the runtime half of the resource pipeline: the graphics
//! resource abstraction the renderer backends implement, the grouped
//! resource manager with named lookup and hot-reload, the NBR runtime
//! importers that turn decoded payloads into live resources, and the
//! built-in geometry shapes.
//!
//! Everything runs on the caller's thread. The file watcher's only job is
//! to feed a channel that [`resources::Resources::poll_reloads`] drains once
//! per frame.

pub mod fs;
pub mod gfx;
pub mod resources;
pub mod scene;

pub use boreal_common as common;
