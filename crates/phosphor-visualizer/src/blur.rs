use glow::HasContext;
use phosphor_core::KERNEL_DIAMETER;

use crate::error::RenderError;
use crate::fbo::RenderTarget;
use crate::program::{compile_fullscreen_program, uniform};
use crate::quad::FullscreenQuad;
use crate::shaders::{self, GlslVersion};

/// Horizontal half of the separable focus blur.
pub struct BlurPass {
    program: glow::Program,
    loc_source: glow::UniformLocation,
    loc_size: glow::UniformLocation,
    loc_kernel: glow::UniformLocation,
}

impl BlurPass {
    pub fn new(gl: &glow::Context, glsl: GlslVersion) -> Result<Self, RenderError> {
        let program = compile_fullscreen_program(gl, glsl, shaders::BLUR_FRAGMENT)?;
        match Self::with_program(gl, program) {
            Ok(pass) => Ok(pass),
            Err(err) => {
                unsafe { gl.delete_program(program) };
                Err(err)
            }
        }
    }

    fn with_program(gl: &glow::Context, program: glow::Program) -> Result<Self, RenderError> {
        Ok(Self {
            program,
            loc_source: uniform(gl, program, "u_source")?,
            loc_size: uniform(gl, program, "u_size")?,
            loc_kernel: uniform(gl, program, "u_kernel")?,
        })
    }

    /// Use the program reading `source` on texture unit 0.
    pub fn bind(&self, gl: &glow::Context, source: &RenderTarget) {
        unsafe {
            gl.use_program(Some(self.program));
            gl.disable(glow::BLEND);
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, Some(source.texture));
            gl.uniform_1_i32(Some(&self.loc_source), 0);
            gl.uniform_2_f32(Some(&self.loc_size), source.width as f32, source.height as f32);
        }
    }

    pub fn set_uniforms(&self, gl: &glow::Context, kernel: &[f32; KERNEL_DIAMETER]) {
        unsafe {
            gl.uniform_1_f32_slice(Some(&self.loc_kernel), kernel);
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
