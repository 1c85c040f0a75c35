// Copyright 2026 the Wayframe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shader program build contract.
//!
//! [`build_program`] runs the single compile + link cycle against any
//! [`ShaderCompiler`]. Attribute locations are fixed by convention and bound
//! before linking, so render callbacks can share vertex-pointer code without
//! querying locations at runtime:
//!
//! | Attribute | Location |
//! |---|---|
//! | `pos` | [`POSITION_ATTRIB`] |
//! | `color` | [`COLOR_ATTRIB`] |
//!
//! Build failures are configuration errors; there is no retry.

use alloc::string::String;

/// Location bound to the `pos` attribute.
pub const POSITION_ATTRIB: u32 = 0;
/// Location bound to the `color` attribute.
pub const COLOR_ATTRIB: u32 = 1;

/// A reserved attribute location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AttributeBinding {
    /// Location index.
    pub index: u32,
    /// Attribute name in the vertex shader.
    pub name: &'static str,
}

/// Bindings applied to every program before linking.
pub const ATTRIBUTE_BINDINGS: [AttributeBinding; 2] = [
    AttributeBinding {
        index: POSITION_ATTRIB,
        name: "pos",
    },
    AttributeBinding {
        index: COLOR_ATTRIB,
        name: "color",
    },
];

/// Programmable pipeline stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex shader.
    Vertex,
    /// Fragment shader.
    Fragment,
}

impl ShaderStage {
    /// Lowercase stage name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        }
    }
}

/// A failed compile or link, carrying the driver's diagnostic log.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProgramError {
    /// A stage failed to compile.
    #[error("compiling {} shader: {log}", .stage.name())]
    Compile {
        /// Stage that failed.
        stage: ShaderStage,
        /// Driver info log.
        log: String,
    },
    /// The program failed to link.
    #[error("linking program:\n{log}")]
    Link {
        /// Driver info log.
        log: String,
    },
}

/// Graphics-API side of [`build_program`].
pub trait ShaderCompiler {
    /// Compiled shader object.
    type Shader;
    /// Linked program object.
    type Program;

    /// Compiles one stage, returning the info log on failure.
    fn compile(&mut self, stage: ShaderStage, source: &str) -> Result<Self::Shader, String>;

    /// Binds `bindings`, links both stages and makes the program current,
    /// returning the info log on failure.
    fn link(
        &mut self,
        fragment: Self::Shader,
        vertex: Self::Shader,
        bindings: &[AttributeBinding],
    ) -> Result<Self::Program, String>;
}

/// Compiles the fragment then the vertex stage, then links them with
/// [`ATTRIBUTE_BINDINGS`].
///
/// # Errors
///
/// Returns [`ProgramError::Compile`] naming the failing stage, or
/// [`ProgramError::Link`].
pub fn build_program<C: ShaderCompiler>(
    compiler: &mut C,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<C::Program, ProgramError> {
    let compile = |compiler: &mut C, stage: ShaderStage, source: &str| {
        compiler
            .compile(stage, source)
            .map_err(|log| ProgramError::Compile { stage, log })
    };

    let fragment = compile(compiler, ShaderStage::Fragment, fragment_source)?;
    let vertex = compile(compiler, ShaderStage::Vertex, vertex_source)?;
    let program = compiler
        .link(fragment, vertex, &ATTRIBUTE_BINDINGS)
        .map_err(|log| ProgramError::Link { log })?;

    tracing::debug!("shader program linked");
    Ok(program)
}
