use glow::HasContext;

use crate::error::RenderError;
use crate::shaders::{self, GlslVersion};

/// Compile and link a vertex/fragment pair of shader bodies as `glsl`.
///
/// Nothing is left behind on failure.
pub fn compile_program(
    gl: &glow::Context,
    glsl: GlslVersion,
    vert_body: &str,
    frag_body: &str,
) -> Result<glow::Program, RenderError> {
    unsafe {
        let vert = compile_shader(gl, glow::VERTEX_SHADER, "vertex", &glsl.source(vert_body))?;
        let frag = match compile_shader(gl, glow::FRAGMENT_SHADER, "fragment", &glsl.source(frag_body)) {
            Ok(frag) => frag,
            Err(err) => {
                gl.delete_shader(vert);
                return Err(err);
            }
        };

        let program = match gl.create_program() {
            Ok(program) => program,
            Err(reason) => {
                gl.delete_shader(vert);
                gl.delete_shader(frag);
                return Err(RenderError::Resource { what: "program", reason });
            }
        };

        gl.attach_shader(program, vert);
        gl.attach_shader(program, frag);
        gl.link_program(program);
        let linked = gl.get_program_link_status(program);

        gl.detach_shader(program, vert);
        gl.detach_shader(program, frag);
        gl.delete_shader(vert);
        gl.delete_shader(frag);

        if !linked {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            return Err(RenderError::ProgramLink(log));
        }
        Ok(program)
    }
}

/// Compile a post-processing fragment shader against the shared quad vertex shader.
pub fn compile_fullscreen_program(
    gl: &glow::Context,
    glsl: GlslVersion,
    frag_body: &str,
) -> Result<glow::Program, RenderError> {
    compile_program(gl, glsl, shaders::FULLSCREEN_VERTEX, frag_body)
}

unsafe fn compile_shader(
    gl: &glow::Context,
    kind: u32,
    stage: &'static str,
    src: &str,
) -> Result<glow::Shader, RenderError> {
    let shader = gl.create_shader(kind).map_err(RenderError::resource("shader"))?;
    gl.shader_source(shader, src);
    gl.compile_shader(shader);
    if !gl.get_shader_compile_status(shader) {
        let log = gl.get_shader_info_log(shader);
        gl.delete_shader(shader);
        return Err(RenderError::ShaderCompile { stage, log });
    }
    Ok(shader)
}

/// Look up a uniform that the program must use.
pub fn uniform(
    gl: &glow::Context,
    program: glow::Program,
    name: &'static str,
) -> Result<glow::UniformLocation, RenderError> {
    unsafe { gl.get_uniform_location(program, name) }.ok_or(RenderError::MissingUniform(name))
}

/// Reinterpret a float slice as bytes for buffer and texture uploads.
pub fn f32_bytes(data: &[f32]) -> &[u8] {
    unsafe { std::slice::from_raw_parts(data.as_ptr() as *const u8, std::mem::size_of_val(data)) }
}
