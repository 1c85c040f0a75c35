// Copyright 2026 the Wayframe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Surface geometry in surface-local logical pixels.

use core::fmt;

/// Width and height of a surface.
///
/// Uses `i32` to match the Wayland wire types carried by configure events and
/// `wl_egl_window_resize`. A zero dimension in a configure event means the
/// compositor leaves the choice to the client.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    /// Width in logical pixels.
    pub width: i32,
    /// Height in logical pixels.
    pub height: i32,
}

impl Size {
    /// Creates a size from width and height.
    #[inline]
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Returns `true` if either dimension is zero or negative.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

impl fmt::Debug for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::Size;

    #[test]
    fn zero_dimension_is_empty() {
        assert!(Size::new(0, 0).is_empty());
        assert!(Size::new(250, 0).is_empty());
        assert!(Size::new(0, 250).is_empty());
        assert!(!Size::new(250, 250).is_empty());
    }
}
