// Copyright 2026 the Wayframe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! GLES2 shader program and the per-frame render context.

#![expect(unsafe_code, reason = "glow's GL calls are unsafe")]

use std::collections::HashMap;
use std::time::Duration;

use glow::HasContext;
use wayframe_core::geometry::Size;
use wayframe_core::program::{AttributeBinding, ShaderCompiler, ShaderStage};
use wayframe_core::surface::FrameInfo;

/// Lookup results keyed by variable name, including misses.
#[derive(Debug)]
struct LocationCache<T> {
    entries: HashMap<String, Option<T>>,
}

impl<T: Clone> LocationCache<T> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    fn get_or_query(&mut self, name: &str, query: impl FnOnce() -> Option<T>) -> Option<T> {
        if let Some(hit) = self.entries.get(name) {
            return hit.clone();
        }
        let location = query();
        if location.is_none() {
            tracing::debug!(name, "shader variable not found");
        }
        self.entries.insert(name.to_owned(), location.clone());
        location
    }
}

/// A linked program with cached uniform and attribute locations.
///
/// Dropping it does not touch GL; the window that owns it deletes the program
/// before releasing its drawable.
#[derive(Debug)]
pub struct Program {
    raw: glow::Program,
    uniforms: LocationCache<glow::UniformLocation>,
    attributes: LocationCache<u32>,
}

impl Program {
    fn new(raw: glow::Program) -> Self {
        Self {
            raw,
            uniforms: LocationCache::new(),
            attributes: LocationCache::new(),
        }
    }

    /// The GL program name.
    #[must_use]
    pub fn raw(&self) -> glow::Program {
        self.raw
    }

    /// Location of uniform `name`, queried once per name.
    pub fn uniform_location(
        &mut self,
        gl: &glow::Context,
        name: &str,
    ) -> Option<glow::UniformLocation> {
        let raw = self.raw;
        // SAFETY: `raw` is a linked program of `gl`.
        self.uniforms
            .get_or_query(name, || unsafe { gl.get_uniform_location(raw, name) })
    }

    /// Location of attribute `name`, queried once per name.
    ///
    /// `pos` and `color` are always at their reserved locations.
    pub fn attribute_location(&mut self, gl: &glow::Context, name: &str) -> Option<u32> {
        let raw = self.raw;
        // SAFETY: `raw` is a linked program of `gl`.
        self.attributes
            .get_or_query(name, || unsafe { gl.get_attrib_location(raw, name) })
    }
}

/// Compiles and links against a current GLES2 context.
#[derive(Debug)]
pub(crate) struct GlesCompiler<'a> {
    gl: &'a glow::Context,
}

impl<'a> GlesCompiler<'a> {
    pub(crate) fn new(gl: &'a glow::Context) -> Self {
        Self { gl }
    }
}

const fn shader_type(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

impl ShaderCompiler for GlesCompiler<'_> {
    type Shader = glow::Shader;
    type Program = Program;

    fn compile(&mut self, stage: ShaderStage, source: &str) -> Result<glow::Shader, String> {
        let gl = self.gl;
        // SAFETY: a context is current and `shader` is only used on it.
        unsafe {
            let shader = gl.create_shader(shader_type(stage))?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);
            if gl.get_shader_compile_status(shader) {
                Ok(shader)
            } else {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                Err(log)
            }
        }
    }

    fn link(
        &mut self,
        fragment: glow::Shader,
        vertex: glow::Shader,
        bindings: &[AttributeBinding],
    ) -> Result<Program, String> {
        let gl = self.gl;
        // SAFETY: a context is current; both shaders compiled on it.
        unsafe {
            let program = gl.create_program()?;
            gl.attach_shader(program, fragment);
            gl.attach_shader(program, vertex);
            for binding in bindings {
                gl.bind_attrib_location(program, binding.index, binding.name);
            }
            gl.link_program(program);

            // Shaders are flagged for deletion either way; the program keeps
            // them alive while attached.
            gl.delete_shader(fragment);
            gl.delete_shader(vertex);

            if !gl.get_program_link_status(program) {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(log);
            }
            gl.use_program(Some(program));
            Ok(Program::new(program))
        }
    }
}

/// What the render callback sees for one redraw.
///
/// The program is current and the viewport covers the whole surface. The
/// callback must not block and must leave the context current.
#[derive(Debug)]
pub struct FrameContext<'a> {
    gl: &'a glow::Context,
    program: &'a mut Program,
    frame: FrameInfo,
    elapsed: Duration,
}

impl<'a> FrameContext<'a> {
    pub(crate) fn new(
        gl: &'a glow::Context,
        program: &'a mut Program,
        frame: FrameInfo,
        elapsed: Duration,
    ) -> Self {
        Self {
            gl,
            program,
            frame,
            elapsed,
        }
    }

    /// GLES2 entry points.
    #[must_use]
    pub fn gl(&self) -> &'a glow::Context {
        self.gl
    }

    /// The window's shader program.
    pub fn program(&mut self) -> &mut Program {
        self.program
    }

    /// Shorthand for [`Program::uniform_location`].
    pub fn uniform_location(&mut self, name: &str) -> Option<glow::UniformLocation> {
        self.program.uniform_location(self.gl, name)
    }

    /// Shorthand for [`Program::attribute_location`].
    pub fn attribute_location(&mut self, name: &str) -> Option<u32> {
        self.program.attribute_location(self.gl, name)
    }

    /// Redraw details from the surface state machine.
    #[must_use]
    pub fn frame(&self) -> FrameInfo {
        self.frame
    }

    /// Current surface size; also the viewport size.
    #[must_use]
    pub fn geometry(&self) -> Size {
        self.frame.geometry
    }

    /// Monotonic time since the window was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

/// Type of the caller's render callback.
pub type DrawFn = dyn FnMut(&mut FrameContext<'_>);

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::LocationCache;

    #[test]
    fn cache_queries_each_name_once() {
        let mut cache = LocationCache::<u32>::new();
        let queries = Cell::new(0);
        let query = || {
            queries.set(queries.get() + 1);
            Some(3)
        };

        assert_eq!(cache.get_or_query("rotation", query), Some(3));
        assert_eq!(cache.get_or_query("rotation", query), Some(3));
        assert_eq!(queries.get(), 1);
    }

    #[test]
    fn misses_are_cached_too() {
        let mut cache = LocationCache::<u32>::new();
        assert_eq!(cache.get_or_query("unused", || None), None);
        assert_eq!(
            cache.get_or_query("unused", || panic!("second lookup must hit the cache")),
            None
        );
    }
}
