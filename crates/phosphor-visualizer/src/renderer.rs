use std::num::NonZeroU32;

use glow::HasContext;
use phosphor_core::{FramePlan, SampleRingBuffer, SurfaceSize};

use crate::accumulation::AccumulationPass;
use crate::blur::BlurPass;
use crate::capabilities::GlCapabilities;
use crate::error::RenderError;
use crate::fbo::RenderTarget;
use crate::quad::FullscreenQuad;
use crate::sample_texture::GlSampleTexture;
use crate::shaders::GlslVersion;
use crate::tone_map::ToneMapPass;

/// Host GL state touched by the passes, restored after every frame.
struct SavedGlState {
    framebuffer: Option<glow::Framebuffer>,
    viewport: [i32; 4],
    blend_enabled: bool,
    blend_src_rgb: i32,
    blend_dst_rgb: i32,
    blend_src_alpha: i32,
    blend_dst_alpha: i32,
    blend_eq_rgb: i32,
    blend_eq_alpha: i32,
    scissor_enabled: bool,
    depth_test_enabled: bool,
    /// `None` on ES, where point size always comes from the shader.
    point_size_enabled: Option<bool>,
    program: Option<glow::Program>,
    vao: Option<glow::VertexArray>,
    array_buffer: Option<glow::Buffer>,
    active_texture: i32,
    texture0: Option<glow::Texture>,
}

fn gl_name(value: i32) -> Option<NonZeroU32> {
    NonZeroU32::new(value as u32)
}

impl SavedGlState {
    unsafe fn save(gl: &glow::Context, glsl: GlslVersion) -> Self {
        let mut viewport = [0i32; 4];
        gl.get_parameter_i32_slice(glow::VIEWPORT, &mut viewport);

        let active_texture = gl.get_parameter_i32(glow::ACTIVE_TEXTURE);
        gl.active_texture(glow::TEXTURE0);
        let texture0 = gl_name(gl.get_parameter_i32(glow::TEXTURE_BINDING_2D)).map(glow::NativeTexture);
        gl.active_texture(active_texture as u32);

        Self {
            framebuffer: gl_name(gl.get_parameter_i32(glow::FRAMEBUFFER_BINDING)).map(glow::NativeFramebuffer),
            viewport,
            blend_enabled: gl.is_enabled(glow::BLEND),
            blend_src_rgb: gl.get_parameter_i32(glow::BLEND_SRC_RGB),
            blend_dst_rgb: gl.get_parameter_i32(glow::BLEND_DST_RGB),
            blend_src_alpha: gl.get_parameter_i32(glow::BLEND_SRC_ALPHA),
            blend_dst_alpha: gl.get_parameter_i32(glow::BLEND_DST_ALPHA),
            blend_eq_rgb: gl.get_parameter_i32(glow::BLEND_EQUATION_RGB),
            blend_eq_alpha: gl.get_parameter_i32(glow::BLEND_EQUATION_ALPHA),
            scissor_enabled: gl.is_enabled(glow::SCISSOR_TEST),
            depth_test_enabled: gl.is_enabled(glow::DEPTH_TEST),
            point_size_enabled: glsl.has_program_point_size().then(|| gl.is_enabled(glow::PROGRAM_POINT_SIZE)),
            program: gl_name(gl.get_parameter_i32(glow::CURRENT_PROGRAM)).map(glow::NativeProgram),
            vao: gl_name(gl.get_parameter_i32(glow::VERTEX_ARRAY_BINDING)).map(glow::NativeVertexArray),
            array_buffer: gl_name(gl.get_parameter_i32(glow::ARRAY_BUFFER_BINDING)).map(glow::NativeBuffer),
            active_texture,
            texture0,
        }
    }

    unsafe fn restore(&self, gl: &glow::Context) {
        gl.bind_framebuffer(glow::FRAMEBUFFER, self.framebuffer);
        gl.viewport(self.viewport[0], self.viewport[1], self.viewport[2], self.viewport[3]);

        set_enabled(gl, glow::BLEND, self.blend_enabled);
        gl.blend_func_separate(
            self.blend_src_rgb as u32,
            self.blend_dst_rgb as u32,
            self.blend_src_alpha as u32,
            self.blend_dst_alpha as u32,
        );
        gl.blend_equation_separate(self.blend_eq_rgb as u32, self.blend_eq_alpha as u32);
        set_enabled(gl, glow::SCISSOR_TEST, self.scissor_enabled);
        set_enabled(gl, glow::DEPTH_TEST, self.depth_test_enabled);
        if let Some(enabled) = self.point_size_enabled {
            set_enabled(gl, glow::PROGRAM_POINT_SIZE, enabled);
        }

        gl.use_program(self.program);
        gl.bind_vertex_array(self.vao);
        gl.bind_buffer(glow::ARRAY_BUFFER, self.array_buffer);

        gl.active_texture(glow::TEXTURE0);
        gl.bind_texture(glow::TEXTURE_2D, self.texture0);
        gl.active_texture(self.active_texture as u32);
    }
}

unsafe fn set_enabled(gl: &glow::Context, cap: u32, enabled: bool) {
    if enabled {
        gl.enable(cap);
    } else {
        gl.disable(cap);
    }
}

/// The two intermediate float targets, sized to the output surface.
struct Targets {
    accumulated: RenderTarget,
    blurred: RenderTarget,
}

impl Targets {
    fn destroy(&self, gl: &glow::Context) {
        self.accumulated.destroy(gl);
        self.blurred.destroy(gl);
    }
}

/// Make sure the targets exist at `surface` size. Resizing clears them.
fn ensure_targets<'a>(
    slot: &'a mut Option<Targets>,
    gl: &glow::Context,
    surface: SurfaceSize,
) -> Result<&'a Targets, RenderError> {
    let SurfaceSize { width, height } = surface;
    let targets = match slot.take() {
        Some(mut targets) => {
            if (targets.accumulated.width, targets.accumulated.height) != (width, height) {
                log::debug!("scope surface resized to {}x{}", width, height);
                let resized = targets
                    .accumulated
                    .resize(gl, width, height)
                    .and_then(|_| targets.blurred.resize(gl, width, height));
                if let Err(err) = resized {
                    targets.destroy(gl);
                    return Err(err);
                }
            }
            targets
        }
        None => {
            let accumulated = RenderTarget::new(gl, width, height)?;
            let blurred = RenderTarget::new(gl, width, height).inspect_err(|_| accumulated.destroy(gl))?;
            Targets { accumulated, blurred }
        }
    };
    Ok(&*slot.insert(targets))
}

/// Drives the three scope passes: accumulation, horizontal blur, vertical blur + tone map.
pub struct ScopeRenderer {
    glsl: GlslVersion,
    quad: FullscreenQuad,
    accumulation: AccumulationPass,
    blur: BlurPass,
    tone_map: ToneMapPass,
    targets: Option<Targets>,
    /// Plan of the last full render, reused to re-present it.
    last_plan: Option<FramePlan>,
}

impl ScopeRenderer {
    /// Check the context and build every program and buffer.
    ///
    /// Must be called with a valid GL context. On failure nothing created
    /// here is left alive.
    pub fn new(gl: &glow::Context) -> Result<Self, RenderError> {
        let capabilities = GlCapabilities::probe(gl);
        capabilities.require()?;

        let quad = FullscreenQuad::new(gl)?;
        let glsl = capabilities.glsl();
        let accumulation = AccumulationPass::new(gl, glsl).inspect_err(|_| quad.destroy(gl))?;
        let blur = BlurPass::new(gl, glsl).inspect_err(|_| {
            quad.destroy(gl);
            accumulation.destroy(gl);
        })?;
        let tone_map = ToneMapPass::new(gl, glsl).inspect_err(|_| {
            quad.destroy(gl);
            accumulation.destroy(gl);
            blur.destroy(gl);
        })?;

        log::info!(
            "scope renderer initialized (GL{} {}.{}, {:?} shaders)",
            if capabilities.embedded { " ES" } else { "" },
            capabilities.major,
            capabilities.minor,
            glsl
        );

        Ok(Self {
            glsl,
            quad,
            accumulation,
            blur,
            tone_map,
            targets: None,
            last_plan: None,
        })
    }

    /// Render one planned frame into the currently bound framebuffer.
    ///
    /// Pending sample uploads are flushed first. `viewport` is
    /// `[x, y, width, height]` in physical pixels for the final output.
    pub fn render(
        &mut self,
        gl: &glow::Context,
        samples: &mut SampleRingBuffer<GlSampleTexture>,
        plan: &FramePlan,
        viewport: [i32; 4],
    ) -> Result<(), RenderError> {
        unsafe {
            let saved = SavedGlState::save(gl, self.glsl);
            gl.disable(glow::SCISSOR_TEST);
            gl.disable(glow::DEPTH_TEST);

            let result = self.draw_passes(gl, samples, plan, saved.framebuffer, viewport);

            saved.restore(gl);
            self.last_plan = result.is_ok().then(|| plan.clone());
            result
        }
    }

    /// Show the last rendered frame again without redrawing it.
    ///
    /// Only the final pass runs, from the held blur target. Returns `false`
    /// if there is nothing to show yet.
    pub fn present(&mut self, gl: &glow::Context, viewport: [i32; 4]) -> bool {
        let (Some(targets), Some(plan)) = (&self.targets, &self.last_plan) else {
            return false;
        };
        unsafe {
            let saved = SavedGlState::save(gl, self.glsl);
            gl.disable(glow::SCISSOR_TEST);
            gl.disable(glow::DEPTH_TEST);
            gl.viewport(viewport[0], viewport[1], viewport[2], viewport[3]);
            self.tone_map.bind(gl, &targets.blurred);
            self.tone_map.set_uniforms(gl, plan);
            self.tone_map.draw(gl, &self.quad);
            saved.restore(gl);
        }
        true
    }

    unsafe fn draw_passes(
        &mut self,
        gl: &glow::Context,
        samples: &mut SampleRingBuffer<GlSampleTexture>,
        plan: &FramePlan,
        output: Option<glow::Framebuffer>,
        viewport: [i32; 4],
    ) -> Result<(), RenderError> {
        let (texture, shadow) = samples.texture_and_shadow();
        let sample_texture = texture.sync(gl, shadow)?;
        let targets = ensure_targets(&mut self.targets, gl, plan.surface)?;
        self.accumulation.set_dot_count(gl, plan.dot_count);

        // 1. Accumulate every sweep additively
        targets.accumulated.bind_cleared(gl);
        self.accumulation.bind(gl, sample_texture);
        self.accumulation.set_uniforms(gl, plan);
        for sweep in &plan.sweeps {
            self.accumulation.draw(gl, sweep, plan.primitive);
        }
        self.accumulation.unbind(gl);

        // 2. Horizontal blur
        targets.blurred.bind_cleared(gl);
        self.blur.bind(gl, &targets.accumulated);
        self.blur.set_uniforms(gl, &plan.kernel);
        self.blur.draw(gl, &self.quad);

        // 3. Vertical blur + tone map into the host framebuffer
        gl.bind_framebuffer(glow::FRAMEBUFFER, output);
        gl.viewport(viewport[0], viewport[1], viewport[2], viewport[3]);
        self.tone_map.bind(gl, &targets.blurred);
        self.tone_map.set_uniforms(gl, plan);
        self.tone_map.draw(gl, &self.quad);

        log::trace!("drew {} sweeps of {} dots", plan.sweeps.len(), plan.dot_count);
        Ok(())
    }

    pub fn destroy(&mut self, gl: &glow::Context) {
        if let Some(targets) = self.targets.take() {
            targets.destroy(gl);
        }
        self.last_plan = None;
        self.accumulation.destroy(gl);
        self.blur.destroy(gl);
        self.tone_map.destroy(gl);
        self.quad.destroy(gl);
    }
}
