pub mod accumulation;
pub mod blur;
pub mod capabilities;
pub mod error;
pub mod fbo;
pub mod program;
pub mod quad;
pub mod renderer;
pub mod sample_texture;
pub mod shaders;
pub mod tone_map;

pub use capabilities::GlCapabilities;
pub use error::RenderError;
pub use renderer::ScopeRenderer;
pub use sample_texture::GlSampleTexture;
pub use shaders::GlslVersion;
