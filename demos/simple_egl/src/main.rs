// Copyright 2026 the Wayframe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Spinning triangle on a Wayland EGL window.
//!
//! Redraws are paced by the compositor's frame callbacks. `Esc` quits, `F11`
//! toggles fullscreen, dragging with the left button moves the window.
//!
//! ```sh
//! RUST_LOG=debug cargo run -p simple_egl -- --opaque
//! ```

#![expect(unsafe_code, reason = "glow's GL calls are unsafe")]

use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;
use glow::HasContext;
use tracing_subscriber::EnvFilter;
use wayframe_core::config::WindowConfig;
use wayframe_core::run::RunOutcome;
use wayframe_wayland::{FrameContext, Platform};

const VERTEX_SHADER: &str = "\
uniform mat4 rotation;
attribute vec4 pos;
attribute vec4 color;
varying vec4 v_color;
void main() {
  gl_Position = rotation * pos;
  v_color = color;
}
";

const FRAGMENT_SHADER: &str = "\
precision mediump float;
varying vec4 v_color;
void main() {
  gl_FragColor = v_color;
}
";

/// Milliseconds per degree of rotation.
const SPEED_DIV: u32 = 5;

#[rustfmt::skip]
const VERTICES: [f32; 6] = [
    -0.5, -0.5,
     0.5, -0.5,
     0.0,  0.5,
];

#[rustfmt::skip]
const COLORS: [f32; 9] = [
    1.0, 0.0, 0.0,
    0.0, 1.0, 0.0,
    0.0, 0.0, 1.0,
];

/// Command-line options.
#[derive(Debug, Parser)]
#[command(name = "simple-egl", about = "Spinning triangle on a Wayland EGL window")]
struct Args {
    /// Run in fullscreen mode.
    #[arg(short, long)]
    fullscreen: bool,
    /// Create an opaque surface.
    #[arg(short, long)]
    opaque: bool,
    /// Initial window width.
    #[arg(long, default_value_t = WindowConfig::DEFAULT_EDGE)]
    width: i32,
    /// Initial window height.
    #[arg(long, default_value_t = WindowConfig::DEFAULT_EDGE)]
    height: i32,
}

/// Column-major rotation matching the classic simple-egl client.
fn rotation(time_ms: u32) -> [f32; 16] {
    let degrees = u16::try_from((time_ms / SPEED_DIV) % 360).unwrap_or_default();
    let angle = f32::from(degrees).to_radians();
    let (sin, cos) = angle.sin_cos();
    [
        cos, 0.0, sin, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        -sin, 0.0, cos, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]
}

fn as_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|value| value.to_ne_bytes()).collect()
}

/// GPU buffers created on the first frame.
#[derive(Debug)]
struct Triangle {
    vertices: glow::Buffer,
    colors: glow::Buffer,
}

impl Triangle {
    fn upload(gl: &glow::Context) -> Result<Self, String> {
        // SAFETY: called from the render callback, where the context is current.
        unsafe {
            let vertices = gl.create_buffer()?;
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vertices));
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, &as_bytes(&VERTICES), glow::STATIC_DRAW);

            let colors = gl.create_buffer()?;
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(colors));
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, &as_bytes(&COLORS), glow::STATIC_DRAW);

            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            Ok(Self { vertices, colors })
        }
    }

    fn draw(&self, frame: &mut FrameContext<'_>) {
        let gl = frame.gl();
        let rotation_location = frame.uniform_location("rotation");
        let (Some(pos), Some(color)) = (
            frame.attribute_location("pos"),
            frame.attribute_location("color"),
        ) else {
            return;
        };
        let matrix = rotation(frame.frame().time_ms);

        // SAFETY: the context is current and both buffers belong to it.
        unsafe {
            gl.uniform_matrix_4_f32_slice(rotation_location.as_ref(), false, &matrix);

            gl.clear_color(0.0, 0.0, 0.0, 0.5);
            gl.clear(glow::COLOR_BUFFER_BIT);

            gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vertices));
            gl.vertex_attrib_pointer_f32(pos, 2, glow::FLOAT, false, 0, 0);
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.colors));
            gl.vertex_attrib_pointer_f32(color, 3, glow::FLOAT, false, 0, 0);
            gl.enable_vertex_attrib_array(pos);
            gl.enable_vertex_attrib_array(color);

            gl.draw_arrays(glow::TRIANGLES, 0, 3);

            gl.disable_vertex_attrib_array(pos);
            gl.disable_vertex_attrib_array(color);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = WindowConfig::new(VERTEX_SHADER, FRAGMENT_SHADER)
        .with_size(args.width, args.height)
        .with_fullscreen(args.fullscreen)
        .with_opaque(args.opaque)
        .with_title("simple-egl");

    let mut platform = Platform::initialize(config).context("initializing the platform")?;

    let mut triangle: Option<Triangle> = None;
    platform
        .create_window(move |frame| {
            if triangle.is_none() {
                match Triangle::upload(frame.gl()) {
                    Ok(uploaded) => triangle = Some(uploaded),
                    Err(err) => {
                        tracing::error!(%err, "uploading the triangle failed");
                        return;
                    }
                }
            }
            if let Some(triangle) = &triangle {
                triangle.draw(frame);
            }
        })
        .context("creating the window")?;

    if let RunOutcome::Disconnected(err) = platform.run() {
        tracing::warn!(%err, "exiting after the compositor connection failed");
    }
    platform.terminate();
    tracing::info!("simple-egl exiting");
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Args, rotation};

    #[test]
    fn rotation_starts_at_identity() {
        let matrix = rotation(0);
        assert_eq!(matrix[0], 1.0);
        assert_eq!(matrix[2], 0.0);
        assert_eq!(matrix[10], 1.0);
    }

    #[test]
    fn rotation_wraps_every_full_turn() {
        assert_eq!(rotation(123), rotation(123 + 360 * super::SPEED_DIV));
    }

    #[test]
    fn short_flags_match_the_classic_usage() {
        let args = Args::try_parse_from(["simple-egl", "-f", "-o"]).unwrap();
        assert!(args.fullscreen);
        assert!(args.opaque);
        assert_eq!(args.width, 250);
    }
}
