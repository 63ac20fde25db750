use glow::HasContext;

use crate::error::RenderError;

/// A framebuffer object with an RGBA16F color texture attachment.
pub struct RenderTarget {
    pub fbo: glow::Framebuffer,
    pub texture: glow::Texture,
    pub width: u32,
    pub height: u32,
}

impl RenderTarget {
    /// Create a cleared render target with the given dimensions.
    pub fn new(gl: &glow::Context, width: u32, height: u32) -> Result<Self, RenderError> {
        unsafe {
            let texture = gl.create_texture().map_err(RenderError::resource("texture"))?;
            let fbo = match gl.create_framebuffer() {
                Ok(fbo) => fbo,
                Err(reason) => {
                    gl.delete_texture(texture);
                    return Err(RenderError::Resource { what: "framebuffer", reason });
                }
            };

            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
            gl.bind_texture(glow::TEXTURE_2D, None);

            let mut target = Self { fbo, texture, width: 0, height: 0 };
            if let Err(err) = target.resize(gl, width, height) {
                target.destroy(gl);
                return Err(err);
            }
            Ok(target)
        }
    }

    /// Reallocate the color storage at a new size and clear it.
    pub fn resize(&mut self, gl: &glow::Context, width: u32, height: u32) -> Result<(), RenderError> {
        unsafe {
            gl.bind_texture(glow::TEXTURE_2D, Some(self.texture));
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA16F as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::FLOAT,
                glow::PixelUnpackData::Slice(None),
            );
            gl.bind_texture(glow::TEXTURE_2D, None);

            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(self.fbo));
            gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D,
                Some(self.texture),
                0,
            );

            let status = gl.check_framebuffer_status(glow::FRAMEBUFFER);
            if status != glow::FRAMEBUFFER_COMPLETE {
                gl.bind_framebuffer(glow::FRAMEBUFFER, None);
                log::error!("Framebuffer incomplete: 0x{:X}", status);
                return Err(RenderError::IncompleteFramebuffer(status));
            }

            self.width = width;
            self.height = height;
            gl.viewport(0, 0, width as i32, height as i32);
            gl.clear_color(0.0, 0.0, 0.0, 0.0);
            gl.clear(glow::COLOR_BUFFER_BIT);
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
        }
        Ok(())
    }

    /// Bind this render target and set its viewport.
    pub fn bind(&self, gl: &glow::Context) {
        unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(self.fbo));
            gl.viewport(0, 0, self.width as i32, self.height as i32);
        }
    }

    /// Bind and clear to transparent black.
    pub fn bind_cleared(&self, gl: &glow::Context) {
        self.bind(gl);
        unsafe {
            gl.clear_color(0.0, 0.0, 0.0, 0.0);
            gl.clear(glow::COLOR_BUFFER_BIT);
        }
    }

    /// Destroy GPU resources.
    pub fn destroy(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_framebuffer(self.fbo);
            gl.delete_texture(self.texture);
        }
    }
}
