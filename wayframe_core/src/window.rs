// Copyright 2026 the Wayframe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Window creation ordering.
//!
//! A window needs a linked shader program and a native surface. The program
//! is built first: a shader that fails to compile is a configuration error,
//! and nothing visible may appear on screen because of it.

use crate::config::WindowConfig;
use crate::geometry::Size;
use crate::program::{ProgramError, ShaderCompiler, build_program};

/// Failure while creating the window.
#[derive(Debug, thiserror::Error)]
pub enum WindowError<E> {
    /// The shader program did not build; no surface was created.
    #[error(transparent)]
    Program(#[from] ProgramError),
    /// The native surface could not be created.
    #[error("creating surface: {0}")]
    Surface(E),
}

/// Builds the configured shader program, then creates the surface.
///
/// `create_surface` receives the initial window size and runs only after the
/// program linked.
///
/// # Errors
///
/// Returns [`WindowError::Program`] without calling `create_surface`, or
/// [`WindowError::Surface`] with whatever `create_surface` returned.
pub fn prepare_window<C, S, E>(
    compiler: &mut C,
    config: &WindowConfig,
    create_surface: impl FnOnce(Size) -> Result<S, E>,
) -> Result<(C::Program, S), WindowError<E>>
where
    C: ShaderCompiler,
{
    let program = build_program(compiler, &config.vertex_source, &config.fragment_source)?;
    let surface = create_surface(config.size()).map_err(WindowError::Surface)?;
    Ok((program, surface))
}
