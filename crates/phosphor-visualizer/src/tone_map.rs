use glow::HasContext;
use phosphor_core::FramePlan;

use crate::error::RenderError;
use crate::fbo::RenderTarget;
use crate::program::{compile_fullscreen_program, uniform};
use crate::quad::FullscreenQuad;
use crate::shaders::{self, GlslVersion};

/// Phosphor color applied after gamma.
pub const PHOSPHOR_TINT: [f32; 3] = [0.1, 1.0, 0.5];

struct Locations {
    source: glow::UniformLocation,
    size: glow::UniformLocation,
    kernel: glow::UniformLocation,
    intensity: glow::UniformLocation,
    invgamma: glow::UniformLocation,
    tint: glow::UniformLocation,
}

/// Vertical half of the focus blur, then intensity, gamma and tint.
pub struct ToneMapPass {
    program: glow::Program,
    loc: Locations,
}

impl ToneMapPass {
    pub fn new(gl: &glow::Context, glsl: GlslVersion) -> Result<Self, RenderError> {
        let program = compile_fullscreen_program(gl, glsl, shaders::TONE_MAP_FRAGMENT)?;
        match Self::locate(gl, program) {
            Ok(loc) => Ok(Self { program, loc }),
            Err(err) => {
                unsafe { gl.delete_program(program) };
                Err(err)
            }
        }
    }

    fn locate(gl: &glow::Context, program: glow::Program) -> Result<Locations, RenderError> {
        Ok(Locations {
            source: uniform(gl, program, "u_source")?,
            size: uniform(gl, program, "u_size")?,
            kernel: uniform(gl, program, "u_kernel")?,
            intensity: uniform(gl, program, "u_intensity")?,
            invgamma: uniform(gl, program, "u_invgamma")?,
            tint: uniform(gl, program, "u_tint")?,
        })
    }

    pub fn bind(&self, gl: &glow::Context, source: &RenderTarget) {
        unsafe {
            gl.use_program(Some(self.program));
            gl.disable(glow::BLEND);
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, Some(source.texture));
            gl.uniform_1_i32(Some(&self.loc.source), 0);
            gl.uniform_2_f32(Some(&self.loc.size), source.width as f32, source.height as f32);
        }
    }

    pub fn set_uniforms(&self, gl: &glow::Context, plan: &FramePlan) {
        let [r, g, b] = PHOSPHOR_TINT;
        unsafe {
            gl.uniform_1_f32_slice(Some(&self.loc.kernel), &plan.kernel);
            gl.uniform_1_f32(Some(&self.loc.intensity), plan.intensity);
            gl.uniform_1_f32(Some(&self.loc.invgamma), plan.invgamma);
            gl.uniform_3_f32(Some(&self.loc.tint), r, g, b);
        }
    }

    pub fn draw(&self, gl: &glow::Context, quad: &FullscreenQuad) {
        quad.draw(gl);
        unsafe {
            gl.bind_texture(glow::TEXTURE_2D, None);
            gl.use_program(None);
        }
    }

    pub fn destroy(&self, gl: &glow::Context) {
        unsafe { gl.delete_program(self.program) };
    }
}
