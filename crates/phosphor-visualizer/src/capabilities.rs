use glow::HasContext;
use phosphor_core::HISTORY_SIZES;

use crate::error::RenderError;
use crate::shaders::GlslVersion;

/// Widest sample texture the scope may ask for.
const MAX_HISTORY: usize = HISTORY_SIZES[HISTORY_SIZES.len() - 1];

/// What the current GL context can do, as far as the scope cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlCapabilities {
    pub major: u32,
    pub minor: u32,
    pub embedded: bool,
    /// Float color attachments can be rendered and blended into.
    pub float_color_buffer: bool,
    /// Float textures may use linear filtering.
    pub float_linear: bool,
    pub max_vertex_texture_units: i32,
    pub max_texture_size: i32,
}

impl GlCapabilities {
    pub fn probe(gl: &glow::Context) -> Self {
        let version = gl.version();
        let extensions = gl.supported_extensions();
        // Desktop GL 3.0 made both of these core.
        let (float_color_buffer, float_linear) = if version.is_embedded {
            (
                extensions.contains("GL_EXT_color_buffer_float")
                    || extensions.contains("GL_EXT_color_buffer_half_float"),
                extensions.contains("GL_OES_texture_float_linear"),
            )
        } else {
            (true, true)
        };

        let (max_vertex_texture_units, max_texture_size) = unsafe {
            (
                gl.get_parameter_i32(glow::MAX_VERTEX_TEXTURE_IMAGE_UNITS),
                gl.get_parameter_i32(glow::MAX_TEXTURE_SIZE),
            )
        };

        Self {
            major: version.major,
            minor: version.minor,
            embedded: version.is_embedded,
            float_color_buffer,
            float_linear,
            max_vertex_texture_units,
            max_texture_size,
        }
    }

    /// Names of every unmet requirement.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        let version_ok = if self.embedded {
            self.major >= 3
        } else {
            (self.major, self.minor) >= (3, 3)
        };
        if !version_ok {
            missing.push("OpenGL 3.3 or OpenGL ES 3.0");
        }
        if !self.float_color_buffer {
            missing.push("float color buffers");
        }
        if !self.float_linear {
            missing.push("linear filtering of float textures");
        }
        if self.max_vertex_texture_units < 1 {
            missing.push("vertex shader texture access");
        }
        if (self.max_texture_size as usize) < MAX_HISTORY {
            missing.push("textures wide enough for the sample history");
        }
        missing
    }

    /// Shader dialect this context compiles.
    pub fn glsl(&self) -> GlslVersion {
        if self.embedded {
            GlslVersion::Es300
        } else {
            GlslVersion::Core330
        }
    }

    pub fn require(&self) -> Result<(), RenderError> {
        let missing = self.missing();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(RenderError::MissingCapability(missing))
        }
    }
}
