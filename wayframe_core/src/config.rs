// Copyright 2026 the Wayframe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Caller-supplied window configuration.
//!
//! [`WindowConfig`] carries the options a demo hands to the platform: the
//! initial window size, the fullscreen and opaque flags, and the shader pair
//! that is compiled once at window creation.

use alloc::string::String;

use crate::geometry::Size;
use crate::input::KeyBindings;

/// Rejected window configuration.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Width or height is zero or negative.
    #[error("window size {width}x{height} must be positive in both dimensions")]
    EmptySize {
        /// Requested width.
        width: i32,
        /// Requested height.
        height: i32,
    },
    /// One of the shader sources is empty.
    #[error("{0} shader source is empty")]
    EmptyShader(&'static str),
}

/// Options for the single accelerated window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowConfig {
    /// Initial (and remembered windowed) width.
    pub width: i32,
    /// Initial (and remembered windowed) height.
    pub height: i32,
    /// Start in fullscreen.
    pub fullscreen: bool,
    /// Select an EGL config without alpha and mark the whole surface opaque.
    pub opaque: bool,
    /// GLSL ES 1.00 vertex shader.
    pub vertex_source: String,
    /// GLSL ES 1.00 fragment shader.
    pub fragment_source: String,
    /// Toplevel title.
    pub title: String,
    /// Toplevel application id.
    pub app_id: String,
    /// Keys routed to window-level actions.
    pub key_bindings: KeyBindings,
}

impl WindowConfig {
    /// Default window edge length, in logical pixels.
    pub const DEFAULT_EDGE: i32 = 250;

    /// Creates a windowed, translucent 250x250 configuration for the given
    /// shader pair.
    #[must_use]
    pub fn new(vertex_source: impl Into<String>, fragment_source: impl Into<String>) -> Self {
        Self {
            width: Self::DEFAULT_EDGE,
            height: Self::DEFAULT_EDGE,
            fullscreen: false,
            opaque: false,
            vertex_source: vertex_source.into(),
            fragment_source: fragment_source.into(),
            title: String::from("simple-egl"),
            app_id: String::from("wayframe.simple-egl"),
            key_bindings: KeyBindings::default(),
        }
    }

    /// Sets the initial window size.
    #[must_use]
    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Sets whether the window starts fullscreen.
    #[must_use]
    pub fn with_fullscreen(mut self, fullscreen: bool) -> Self {
        self.fullscreen = fullscreen;
        self
    }

    /// Sets whether the surface is opaque.
    #[must_use]
    pub fn with_opaque(mut self, opaque: bool) -> Self {
        self.opaque = opaque;
        self
    }

    /// Sets the toplevel title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Replaces the key bindings.
    #[must_use]
    pub fn with_key_bindings(mut self, key_bindings: KeyBindings) -> Self {
        self.key_bindings = key_bindings;
        self
    }

    /// Returns the initial window size.
    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Checks the configuration before any platform resource is acquired.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a non-positive size or an empty shader.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size().is_empty() {
            return Err(ConfigError::EmptySize {
                width: self.width,
                height: self.height,
            });
        }
        if self.vertex_source.trim().is_empty() {
            return Err(ConfigError::EmptyShader("vertex"));
        }
        if self.fragment_source.trim().is_empty() {
            return Err(ConfigError::EmptyShader("fragment"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, WindowConfig};
    use crate::geometry::Size;

    const VS: &str = "attribute vec4 pos; void main() { gl_Position = pos; }";
    const FS: &str = "void main() { gl_FragColor = vec4(1.0); }";

    #[test]
    fn defaults_match_simple_egl() {
        let config = WindowConfig::new(VS, FS);
        assert_eq!(config.size(), Size::new(250, 250));
        assert!(!config.fullscreen);
        assert!(!config.opaque);
        assert_eq!(config.title, "simple-egl");
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn zero_size_is_rejected() {
        let config = WindowConfig::new(VS, FS).with_size(0, 100);
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptySize {
                width: 0,
                height: 100
            })
        );
    }

    #[test]
    fn empty_shader_is_rejected() {
        let config = WindowConfig::new("  \n", FS);
        assert_eq!(config.validate(), Err(ConfigError::EmptyShader("vertex")));

        let config = WindowConfig::new(VS, "");
        assert_eq!(config.validate(), Err(ConfigError::EmptyShader("fragment")));
    }

    #[test]
    fn builder_sets_flags() {
        let config = WindowConfig::new(VS, FS)
            .with_size(640, 480)
            .with_fullscreen(true)
            .with_opaque(true)
            .with_title("demo");
        assert_eq!(config.size(), Size::new(640, 480));
        assert!(config.fullscreen);
        assert!(config.opaque);
        assert_eq!(config.title, "demo");
    }
}
