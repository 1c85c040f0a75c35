// Copyright 2026 the Wayframe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! EGL rendering context and the accelerated drawable.
//!
//! Resource ownership is encoded in guards so that release order does not
//! depend on call sites:
//!
//! ```text
//!   GraphicsContext ─┐
//!                    ├─► Rc<EglShared>   (display, context, GL functions)
//!   WindowSurface ───┘        │
//!     ├─ EGL surface          └─ last drop: unbind, destroy context,
//!     └─ NativeWindow            terminate display, release thread
//! ```
//!
//! Dropping a [`WindowSurface`] unbinds the context before the EGL surface is
//! destroyed, then destroys the `wl_egl_window` it was created from. The
//! display outlives every surface because each one holds a reference to it.

#![expect(unsafe_code, reason = "EGL and libwayland-egl are C APIs")]

use std::ffi::c_void;
use std::fmt;
use std::ptr::{self, NonNull};
use std::rc::Rc;

use khronos_egl::{self as egl, API as EGL};
use wayframe_core::geometry::Size;
use wayland_client::Proxy;
use wayland_client::protocol::wl_surface::WlSurface;
use wayland_sys::egl::{WaylandEgl, wayland_egl_option, wl_egl_window};

use crate::error::GraphicsError;

const SURFACELESS_EXTENSION: &str = "EGL_KHR_surfaceless_context";

const CONTEXT_ATTRIBUTES: [egl::Int; 3] = [egl::CONTEXT_CLIENT_VERSION, 2, egl::NONE];

/// Config attributes for a GLES2 window surface.
///
/// Opaque surfaces ask for no alpha channel so the compositor can skip
/// blending.
fn config_attributes(opaque: bool) -> [egl::Int; 13] {
    [
        egl::SURFACE_TYPE,
        egl::WINDOW_BIT,
        egl::RED_SIZE,
        1,
        egl::GREEN_SIZE,
        1,
        egl::BLUE_SIZE,
        1,
        egl::ALPHA_SIZE,
        if opaque { 0 } else { 1 },
        egl::RENDERABLE_TYPE,
        egl::OPENGL_ES2_BIT,
        egl::NONE,
    ]
}

/// Returns the only candidate, or [`GraphicsError::ConfigCount`].
fn select_single<T: Copy>(found: &[T]) -> Result<T, GraphicsError> {
    match found {
        [only] => Ok(*only),
        _ => Err(GraphicsError::ConfigCount(found.len())),
    }
}

fn has_extension(extensions: &str, name: &str) -> bool {
    extensions.split_ascii_whitespace().any(|ext| ext == name)
}

fn destroy_context(display: egl::Display, context: egl::Context) {
    if let Err(err) = EGL.destroy_context(display, context) {
        tracing::warn!(%err, "eglDestroyContext failed");
    }
}

struct EglShared {
    display: egl::Display,
    context: egl::Context,
    gl: glow::Context,
}

impl EglShared {
    fn unbind(&self) {
        if let Err(err) = EGL.make_current(self.display, None, None, None) {
            tracing::warn!(%err, "eglMakeCurrent(EGL_NO_CONTEXT) failed");
        }
    }
}

impl Drop for EglShared {
    fn drop(&mut self) {
        self.unbind();
        destroy_context(self.display, self.context);
        if let Err(err) = EGL.terminate(self.display) {
            tracing::warn!(%err, "eglTerminate failed");
        }
        if let Err(err) = EGL.release_thread() {
            tracing::warn!(%err, "eglReleaseThread failed");
        }
        tracing::debug!("EGL context released");
    }
}

/// The EGL display, context and loaded GLES2 entry points.
pub struct GraphicsContext {
    shared: Rc<EglShared>,
    config: egl::Config,
}

impl fmt::Debug for GraphicsContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphicsContext")
            .field("display", &self.shared.display)
            .field("context", &self.shared.context)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GraphicsContext {
    /// Acquires a GLES2 context on the Wayland display behind `display_ptr`.
    ///
    /// On success the context is current without a surface, so shaders can
    /// be built before any window exists.
    ///
    /// # Errors
    ///
    /// Any failure is fatal: initialization, API binding, config selection
    /// (exactly one candidate), context creation or surfaceless binding.
    pub(crate) fn acquire(display_ptr: *mut c_void, opaque: bool) -> Result<Self, GraphicsError> {
        // SAFETY: `display_ptr` is the live `wl_display` of the connection,
        // which outlives this context.
        let display =
            unsafe { EGL.get_display(display_ptr) }.ok_or(GraphicsError::NoDisplay)?;
        let (major, minor) = EGL.initialize(display).map_err(GraphicsError::Initialize)?;
        tracing::info!(major, minor, "EGL initialized");

        let result = Self::create_context(display, opaque);
        if result.is_err()
            && let Err(err) = EGL.terminate(display)
        {
            tracing::warn!(%err, "eglTerminate failed");
        }
        result
    }

    fn create_context(display: egl::Display, opaque: bool) -> Result<Self, GraphicsError> {
        EGL.bind_api(egl::OPENGL_ES_API)
            .map_err(GraphicsError::BindApi)?;

        let mut found = Vec::with_capacity(1);
        EGL.choose_config(display, &config_attributes(opaque), &mut found)
            .map_err(GraphicsError::ChooseConfig)?;
        let config = select_single(&found)?;

        let context = EGL
            .create_context(display, config, None, &CONTEXT_ATTRIBUTES)
            .map_err(GraphicsError::CreateContext)?;

        let extensions = EGL
            .query_string(Some(display), egl::EXTENSIONS)
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !has_extension(&extensions, SURFACELESS_EXTENSION) {
            destroy_context(display, context);
            return Err(GraphicsError::NoSurfaceless);
        }
        if let Err(err) = EGL.make_current(display, None, None, Some(context)) {
            destroy_context(display, context);
            return Err(GraphicsError::MakeCurrent(err));
        }

        // SAFETY: the context is current on this thread, and the loader only
        // returns entry points of the bound client API.
        let gl = unsafe {
            glow::Context::from_loader_function(|name| {
                EGL.get_proc_address(name)
                    .map_or(ptr::null(), |func| func as *const c_void)
            })
        };
        tracing::debug!(opaque, "GLES2 context current without a surface");

        Ok(Self {
            shared: Rc::new(EglShared {
                display,
                context,
                gl,
            }),
            config,
        })
    }

    /// GLES2 entry points of the context.
    #[must_use]
    pub fn gl(&self) -> &glow::Context {
        &self.shared.gl
    }

    /// Creates the accelerated drawable for `surface` and makes the context
    /// current on it.
    pub(crate) fn create_window_surface(
        &self,
        surface: &WlSurface,
        size: Size,
    ) -> Result<WindowSurface, GraphicsError> {
        let native = NativeWindow::new(surface, size)?;
        // SAFETY: `native` is a live `wl_egl_window` on the same display.
        let egl_surface = unsafe {
            EGL.create_window_surface(self.shared.display, self.config, native.as_ptr(), None)
        }
        .map_err(GraphicsError::CreateSurface)?;

        let drawable = WindowSurface {
            surface: egl_surface,
            native,
            shared: Rc::clone(&self.shared),
        };
        EGL.make_current(
            self.shared.display,
            Some(egl_surface),
            Some(egl_surface),
            Some(self.shared.context),
        )
        .map_err(GraphicsError::MakeCurrent)?;
        tracing::debug!(?size, "window surface current");
        Ok(drawable)
    }
}

/// The accelerated drawable bound to the single window.
pub(crate) struct WindowSurface {
    surface: egl::Surface,
    native: NativeWindow,
    shared: Rc<EglShared>,
}

impl fmt::Debug for WindowSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowSurface")
            .field("surface", &self.surface)
            .field("native", &self.native)
            .finish_non_exhaustive()
    }
}

impl WindowSurface {
    pub(crate) fn gl(&self) -> &glow::Context {
        &self.shared.gl
    }

    pub(crate) fn resize(&self, size: Size) {
        self.native.resize(size);
    }

    /// Posts the back buffer, committing the surface.
    pub(crate) fn swap_buffers(&self) -> Result<(), egl::Error> {
        EGL.swap_buffers(self.shared.display, self.surface)
    }
}

impl Drop for WindowSurface {
    fn drop(&mut self) {
        // Destroying a surface that is still current faults some drivers.
        self.shared.unbind();
        if let Err(err) = EGL.destroy_surface(self.shared.display, self.surface) {
            tracing::warn!(%err, "eglDestroySurface failed");
        }
        // `native` drops next and destroys the wl_egl_window.
    }
}

/// Owned `wl_egl_window`.
struct NativeWindow {
    lib: &'static WaylandEgl,
    window: NonNull<wl_egl_window>,
}

impl fmt::Debug for NativeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NativeWindow").field(&self.window).finish()
    }
}

impl NativeWindow {
    fn new(surface: &WlSurface, size: Size) -> Result<Self, GraphicsError> {
        let lib = wayland_egl_option().ok_or(GraphicsError::NoWaylandEgl)?;
        let proxy = surface.id().as_ptr();
        if proxy.is_null() {
            return Err(GraphicsError::NativeWindow);
        }
        // SAFETY: `proxy` is a live `wl_surface` owned by the system backend.
        let raw = unsafe { (lib.wl_egl_window_create)(proxy, size.width, size.height) };
        let window = NonNull::new(raw).ok_or(GraphicsError::NativeWindow)?;
        Ok(Self { lib, window })
    }

    fn as_ptr(&self) -> egl::NativeWindowType {
        self.window.as_ptr().cast()
    }

    fn resize(&self, size: Size) {
        // SAFETY: the window is alive until `drop`.
        unsafe { (self.lib.wl_egl_window_resize)(self.window.as_ptr(), size.width, size.height, 0, 0) };
    }
}

impl Drop for NativeWindow {
    fn drop(&mut self) {
        // SAFETY: created by `wl_egl_window_create` and destroyed once.
        unsafe { (self.lib.wl_egl_window_destroy)(self.window.as_ptr()) };
    }
}

#[cfg(test)]
mod tests {
    use khronos_egl as egl;

    use super::{config_attributes, has_extension, select_single};
    use crate::error::GraphicsError;

    fn attribute(list: &[egl::Int], key: egl::Int) -> Option<egl::Int> {
        list.chunks(2)
            .find(|pair| pair[0] == key)
            .and_then(|pair| pair.get(1).copied())
    }

    #[test]
    fn translucent_config_requests_alpha() {
        let attrs = config_attributes(false);
        assert_eq!(attribute(&attrs, egl::ALPHA_SIZE), Some(1));
        assert_eq!(attribute(&attrs, egl::RENDERABLE_TYPE), Some(egl::OPENGL_ES2_BIT));
        assert_eq!(attrs.last(), Some(&egl::NONE));
    }

    #[test]
    fn opaque_config_drops_alpha() {
        let attrs = config_attributes(true);
        assert_eq!(attribute(&attrs, egl::ALPHA_SIZE), Some(0));
        assert_eq!(attribute(&attrs, egl::SURFACE_TYPE), Some(egl::WINDOW_BIT));
    }

    #[test]
    fn exactly_one_config_is_required() {
        assert!(matches!(select_single::<u8>(&[]), Err(GraphicsError::ConfigCount(0))));
        assert!(matches!(select_single(&[1_u8, 2]), Err(GraphicsError::ConfigCount(2))));
        assert!(matches!(select_single(&[7_u8]), Ok(7)));
    }

    #[test]
    fn extension_match_is_whole_word() {
        let list = "EGL_KHR_image_base EGL_KHR_surfaceless_context_extra EGL_EXT_foo";
        assert!(!has_extension(list, "EGL_KHR_surfaceless_context"));
        assert!(has_extension(
            "EGL_EXT_foo EGL_KHR_surfaceless_context",
            "EGL_KHR_surfaceless_context"
        ));
    }
}
