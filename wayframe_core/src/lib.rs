// Copyright 2026 the Wayframe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Platform-independent core of a single-window Wayland client.
//!
//! `wayframe_core` holds the state machines and contracts that decide *what*
//! the client asks of the compositor, without talking to it. It is `no_std`
//! compatible (with `alloc`); the Wayland and EGL bindings live in
//! `wayframe_wayland`, which feeds compositor events in and executes the
//! requests that come out.
//!
//! # Architecture
//!
//! ```text
//!   registry globals ──► GlobalTable::advertise() ──► bind proxies
//!
//!   WindowConfig ──► prepare_window() ──► build_program() ──► create surface
//!                                                                  │
//!                 ┌────────────────────────────────────────────────┘
//!                 ▼
//!   configure / sync / frame ──► SurfaceState ──► SurfaceRequests
//!                 ▲
//!   seat input ──► InputRouter ──► InputAction (toggle, move, cursor, quit)
//!
//!   RunToken ◄── quit key, close request, interrupt signal (stop flag)
//! ```
//!
//! **[`surface`]**: the accelerated-surface state machine. Configuration
//! acknowledgment, fullscreen/windowed geometry and frame pacing (at most one
//! frame callback in flight).
//!
//! **[`input`]**: maps pointer and keyboard events to window-level actions
//! and reconciles seat capabilities.
//!
//! **[`program`]**: shader compile + link contract with reserved attribute
//! locations.
//!
//! **[`window`]**: creation ordering; the program is built before any
//! surface exists.
//!
//! **[`globals`]**: registry discovery bookkeeping.
//!
//! **[`run`]**: the cancellation token and blocking run loop.
//!
//! **[`config`]** and **[`geometry`]**: caller options and sizes.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod config;
pub mod geometry;
pub mod globals;
pub mod input;
pub mod program;
pub mod run;
pub mod surface;
pub mod window;
