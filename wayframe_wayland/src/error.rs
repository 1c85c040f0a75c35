// Copyright 2026 the Wayframe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fatal configuration errors.

use std::io;

use khronos_egl as egl;
use wayframe_core::config::ConfigError;
use wayframe_core::program::ProgramError;
use wayland_client::{ConnectError, DispatchError};

/// Failure to acquire or use the EGL rendering context.
#[derive(Debug, thiserror::Error)]
pub enum GraphicsError {
    /// `eglGetDisplay` returned no display for the Wayland connection.
    #[error("no EGL display for the Wayland connection")]
    NoDisplay,
    /// `eglInitialize` failed.
    #[error("initializing EGL")]
    Initialize(#[source] egl::Error),
    /// `eglBindAPI(EGL_OPENGL_ES_API)` failed.
    #[error("binding the OpenGL ES API")]
    BindApi(#[source] egl::Error),
    /// `eglChooseConfig` failed.
    #[error("choosing an EGL config")]
    ChooseConfig(#[source] egl::Error),
    /// Config selection did not yield exactly one candidate.
    #[error("expected exactly one matching EGL config, found {0}")]
    ConfigCount(usize),
    /// `eglCreateContext` failed.
    #[error("creating the EGL context")]
    CreateContext(#[source] egl::Error),
    /// The display cannot make a context current without a surface.
    #[error("EGL_KHR_surfaceless_context is not supported")]
    NoSurfaceless,
    /// `eglMakeCurrent` failed.
    #[error("making the EGL context current")]
    MakeCurrent(#[source] egl::Error),
    /// `libwayland-egl` could not be loaded.
    #[error("libwayland-egl could not be loaded")]
    NoWaylandEgl,
    /// `wl_egl_window_create` returned null.
    #[error("creating the native EGL window failed")]
    NativeWindow,
    /// `eglCreateWindowSurface` failed.
    #[error("creating the EGL window surface")]
    CreateSurface(#[source] egl::Error),
}

/// Fatal error from the platform lifecycle.
///
/// Every variant is a configuration or environment mistake; none is retried.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// The window configuration was rejected before connecting.
    #[error("invalid window configuration")]
    Config(#[from] ConfigError),
    /// Another platform instance is alive in this process.
    #[error("a platform instance already exists in this process")]
    AlreadyInitialized,
    /// The compositor is unreachable.
    #[error("connecting to the Wayland compositor")]
    Connect(#[from] ConnectError),
    /// A blocking round-trip failed during setup.
    #[error("Wayland dispatch failed during setup")]
    Dispatch(#[from] DispatchError),
    /// A required global was not advertised.
    #[error("compositor does not advertise `{0}`")]
    MissingGlobal(&'static str),
    /// The rendering context could not be acquired.
    #[error("acquiring the rendering context")]
    Graphics(#[from] GraphicsError),
    /// The shader program did not build.
    #[error("building the shader program")]
    Program(#[from] ProgramError),
    /// [`create_window`](crate::Platform::create_window) was called twice.
    #[error("the window has already been created")]
    WindowExists,
    /// The interrupt handler could not be installed.
    #[error("installing the interrupt handler")]
    Signal(#[source] io::Error),
}

#[cfg(test)]
mod tests {
    use wayframe_core::program::{ProgramError, ShaderStage};

    use super::{GraphicsError, PlatformError};

    #[test]
    fn program_log_is_kept_as_source() {
        let err = PlatformError::from(ProgramError::Compile {
            stage: ShaderStage::Fragment,
            log: "0:3(2): error: `colr' undeclared".into(),
        });
        assert_eq!(err.to_string(), "building the shader program");

        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(
            source.as_deref(),
            Some("compiling fragment shader: 0:3(2): error: `colr' undeclared")
        );
    }

    #[test]
    fn config_count_names_the_count() {
        let err = PlatformError::from(GraphicsError::ConfigCount(0));
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(
            source.as_deref(),
            Some("expected exactly one matching EGL config, found 0")
        );
    }
}
