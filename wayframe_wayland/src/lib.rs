// Copyright 2026 the Wayframe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wayland backend for wayframe.
//!
//! This crate connects the platform-independent state machines in
//! [`wayframe_core`] to a running compositor:
//!
//! - [`CompositorConnection`]: transport, registry discovery, blocking dispatch
//! - [`GraphicsContext`]: EGL display and GLES2 context (`khronos-egl`, `glow`)
//! - the accelerated window: `xdg_toplevel` + `wl_egl_window` drawable
//! - seat handling: pointer, keyboard and the themed cursor
//! - [`Platform`]: the lifecycle facade (`initialize`, `create_window`, `run`,
//!   `terminate`)
//!
//! Everything here lives on the thread that created the [`Platform`].
//!
//! ```no_run
//! use wayframe_core::config::WindowConfig;
//! use wayframe_wayland::Platform;
//!
//! # fn main() -> Result<(), wayframe_wayland::PlatformError> {
//! let config = WindowConfig::new(VERTEX, FRAGMENT).with_size(250, 250);
//! let mut platform = Platform::initialize(config)?;
//! platform.create_window(|frame| {
//!     let _ = frame.geometry();
//! })?;
//! let _ = platform.run();
//! platform.terminate();
//! # Ok(())
//! # }
//! # const VERTEX: &str = "";
//! # const FRAGMENT: &str = "";
//! ```

mod connection;
mod egl;
mod error;
mod input;
mod platform;
mod program;
mod signal;
mod state;
mod surface;
mod time;

pub use connection::CompositorConnection;
pub use egl::GraphicsContext;
pub use error::{GraphicsError, PlatformError};
pub use platform::Platform;
pub use program::{DrawFn, FrameContext, Program};
pub use signal::install_interrupt_handler;
pub use state::PlatformState;
pub use surface::CallbackKind;
pub use time::{FrameClock, now};
