use glow::HasContext;
use phosphor_core::{SampleTexture, CHANNELS};

use crate::error::RenderError;
use crate::program::f32_bytes;

/// Pending partial uploads before a single full upload is cheaper.
const MAX_PENDING_RANGES: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pending {
    Ranges(Vec<(usize, usize)>),
    Everything,
}

/// 1×N RG32F texture holding the sample history.
///
/// Writes arrive from the engine without a GL context, so they are recorded
/// as dirty ranges and copied from the CPU shadow by [`GlSampleTexture::sync`]
/// right before drawing.
#[derive(Debug)]
pub struct GlSampleTexture {
    handle: Option<glow::Texture>,
    /// Width the engine asked for.
    samples: usize,
    /// Width of the GL storage currently allocated.
    allocated: usize,
    pending: Pending,
}

impl Default for GlSampleTexture {
    fn default() -> Self {
        Self {
            handle: None,
            samples: 0,
            allocated: 0,
            pending: Pending::Ranges(Vec::new()),
        }
    }
}

impl SampleTexture for GlSampleTexture {
    fn allocate(&mut self, samples: usize) {
        self.samples = samples;
        self.pending = Pending::Everything;
    }

    fn write(&mut self, offset: usize, interleaved: &[f32]) {
        let samples = interleaved.len() / CHANNELS;
        if let Pending::Ranges(ranges) = &mut self.pending {
            if ranges.len() < MAX_PENDING_RANGES {
                ranges.push((offset, samples));
            } else {
                self.pending = Pending::Everything;
            }
        }
    }
}

impl GlSampleTexture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether anything is waiting to be uploaded.
    pub fn is_dirty(&self) -> bool {
        self.handle.is_none() || self.pending != Pending::Ranges(Vec::new())
    }

    /// Bring the GL texture up to date with `shadow`, creating it if needed.
    pub fn sync(&mut self, gl: &glow::Context, shadow: &[f32]) -> Result<glow::Texture, RenderError> {
        let texture = match self.handle {
            Some(texture) => texture,
            None => {
                let texture = unsafe { gl.create_texture() }.map_err(RenderError::resource("sample texture"))?;
                self.handle = Some(texture);
                self.allocated = 0;
                texture
            }
        };

        let pending = std::mem::replace(&mut self.pending, Pending::Ranges(Vec::new()));
        unsafe {
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));

            if self.allocated != self.samples {
                gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
                gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
                gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
                gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
                gl.tex_image_2d(
                    glow::TEXTURE_2D,
                    0,
                    glow::RG32F as i32,
                    self.samples as i32,
                    1,
                    0,
                    glow::RG,
                    glow::FLOAT,
                    glow::PixelUnpackData::Slice(Some(f32_bytes(shadow))),
                );
                self.allocated = self.samples;
                log::debug!("allocated {}-sample scope texture", self.samples);
            } else {
                match pending {
                    Pending::Everything => upload(gl, 0, shadow),
                    Pending::Ranges(ranges) => {
                        for (offset, samples) in ranges {
                            let start = offset * CHANNELS;
                            upload(gl, offset, &shadow[start..start + samples * CHANNELS]);
                        }
                    }
                }
            }

            gl.bind_texture(glow::TEXTURE_2D, None);
        }
        Ok(texture)
    }

    /// Drop the handle without deleting it, after the context that owned it is gone.
    pub fn forget(&mut self) {
        self.handle = None;
        self.allocated = 0;
        self.pending = Pending::Everything;
    }

    pub fn destroy(&mut self, gl: &glow::Context) {
        if let Some(texture) = self.handle.take() {
            unsafe { gl.delete_texture(texture) };
        }
        self.allocated = 0;
        self.pending = Pending::Everything;
    }
}

unsafe fn upload(gl: &glow::Context, offset: usize, interleaved: &[f32]) {
    gl.tex_sub_image_2d(
        glow::TEXTURE_2D,
        0,
        offset as i32,
        0,
        (interleaved.len() / CHANNELS) as i32,
        1,
        glow::RG,
        glow::FLOAT,
        glow::PixelUnpackData::Slice(Some(f32_bytes(interleaved))),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use phosphor_core::SampleRingBuffer;

    #[test]
    fn writes_are_recorded_until_sync() {
        let mut buffer = SampleRingBuffer::new(8, GlSampleTexture::new());
        buffer.write(&[0.0; 6]).unwrap();
        assert!(buffer.texture().is_dirty());
        // Fresh allocations always upload the whole shadow.
        assert_eq!(buffer.texture().pending, Pending::Everything);
    }

    #[test]
    fn many_small_writes_collapse() {
        let mut texture = GlSampleTexture::new();
        texture.pending = Pending::Ranges(Vec::new());
        for i in 0..MAX_PENDING_RANGES {
            texture.write(i, &[0.0, 0.0]);
        }
        assert!(matches!(&texture.pending, Pending::Ranges(r) if r.len() == MAX_PENDING_RANGES));
        texture.write(0, &[0.0, 0.0]);
        assert_eq!(texture.pending, Pending::Everything);
    }
}
