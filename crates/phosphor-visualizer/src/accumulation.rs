use glow::HasContext;
use phosphor_core::{FramePlan, Primitive, Sweep};

use crate::error::RenderError;
use crate::program::{compile_program, f32_bytes, uniform};
use crate::shaders::{self, GlslVersion};

/// Relative time of every interpolated dot, sampled at dot centers.
pub fn dot_times(dot_count: usize) -> Vec<f32> {
    (0..dot_count)
        .map(|i| (i as f32 + 0.5) / dot_count as f32)
        .collect()
}

/// Draws the sample history as additive points or a line strip, once per sweep.
pub struct AccumulationPass {
    program: glow::Program,
    vao: glow::VertexArray,
    time_vbo: glow::Buffer,
    dot_count: usize,
    glsl: GlslVersion,
    loc_projection: glow::UniformLocation,
    loc_cut_point: glow::UniformLocation,
    loc_samples: glow::UniformLocation,
    loc_persistence_gamma: glow::UniformLocation,
}

impl AccumulationPass {
    pub fn new(gl: &glow::Context, glsl: GlslVersion) -> Result<Self, RenderError> {
        let program = compile_program(gl, glsl, shaders::ACCUMULATION_VERTEX, shaders::ACCUMULATION_FRAGMENT)?;
        match Self::with_program(gl, program, glsl) {
            Ok(pass) => Ok(pass),
            Err(err) => {
                unsafe { gl.delete_program(program) };
                Err(err)
            }
        }
    }

    fn with_program(gl: &glow::Context, program: glow::Program, glsl: GlslVersion) -> Result<Self, RenderError> {
        let loc_projection = uniform(gl, program, "u_projection")?;
        let loc_cut_point = uniform(gl, program, "u_cut_point")?;
        let loc_samples = uniform(gl, program, "u_samples")?;
        let loc_persistence_gamma = uniform(gl, program, "u_persistence_gamma")?;

        unsafe {
            let vao = gl.create_vertex_array().map_err(RenderError::resource("vertex array"))?;
            let time_vbo = match gl.create_buffer() {
                Ok(vbo) => vbo,
                Err(reason) => {
                    gl.delete_vertex_array(vao);
                    return Err(RenderError::Resource { what: "time buffer", reason });
                }
            };

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(time_vbo));
            // a_relative_time: location 0
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 1, glow::FLOAT, false, 0, 0);
            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);

            Ok(Self {
                program,
                vao,
                time_vbo,
                dot_count: 0,
                glsl,
                loc_projection,
                loc_cut_point,
                loc_samples,
                loc_persistence_gamma,
            })
        }
    }

    /// Rebuild the time attribute buffer if the dot count changed.
    pub fn set_dot_count(&mut self, gl: &glow::Context, dot_count: usize) {
        if dot_count == self.dot_count {
            return;
        }
        let times = dot_times(dot_count);
        unsafe {
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.time_vbo));
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, f32_bytes(&times), glow::STATIC_DRAW);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
        log::debug!("time attribute rebuilt for {} dots", dot_count);
        self.dot_count = dot_count;
    }

    /// Use the program with `samples` on texture unit 0, blending additively.
    pub fn bind(&self, gl: &glow::Context, samples: glow::Texture) {
        unsafe {
            gl.use_program(Some(self.program));
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, Some(samples));
            gl.uniform_1_i32(Some(&self.loc_samples), 0);

            gl.enable(glow::BLEND);
            gl.blend_equation(glow::FUNC_ADD);
            gl.blend_func(glow::ONE, glow::ONE);
            if self.glsl.has_program_point_size() {
                gl.enable(glow::PROGRAM_POINT_SIZE);
            }

            gl.bind_vertex_array(Some(self.vao));
        }
    }

    /// Uniforms shared by every sweep of the frame.
    pub fn set_uniforms(&self, gl: &glow::Context, plan: &FramePlan) {
        unsafe {
            gl.uniform_1_f32(Some(&self.loc_cut_point), plan.cut_point);
            gl.uniform_1_f32(Some(&self.loc_persistence_gamma), plan.persistence_gamma);
        }
    }

    /// One draw of the whole history through the sweep's projection.
    pub fn draw(&self, gl: &glow::Context, sweep: &Sweep, primitive: Primitive) {
        let mode = match primitive {
            Primitive::Points => glow::POINTS,
            Primitive::LineStrip => glow::LINE_STRIP,
        };
        unsafe {
            gl.uniform_matrix_4_f32_slice(
                Some(&self.loc_projection),
                false,
                &sweep.projection.to_cols_array(),
            );
            gl.draw_arrays(mode, 0, self.dot_count as i32);
        }
    }

    pub fn unbind(&self, gl: &glow::Context) {
        unsafe {
            gl.bind_vertex_array(None);
            gl.bind_texture(glow::TEXTURE_2D, None);
            if self.glsl.has_program_point_size() {
                gl.disable(glow::PROGRAM_POINT_SIZE);
            }
            gl.disable(glow::BLEND);
            gl.use_program(None);
        }
    }

    pub fn destroy(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_program(self.program);
            gl.delete_vertex_array(self.vao);
            gl.delete_buffer(self.time_vbo);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_times_are_centered() {
        let times = dot_times(4);
        assert_eq!(times, vec![0.125, 0.375, 0.625, 0.875]);
    }

    #[test]
    fn dot_times_stay_inside_unit_interval() {
        let times = dot_times(phosphor_core::scope::dot_count(8192));
        assert!(times.iter().all(|t| *t > 0.0 && *t < 1.0));
        assert!(times.windows(2).all(|w| w[0] < w[1]));
    }
}
