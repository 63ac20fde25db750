use thiserror::Error;

/// Failure to build or drive the GPU pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("GL context lacks required capabilities: {}", .0.join(", "))]
    MissingCapability(Vec<&'static str>),
    #[error("{stage} shader failed to compile:\n{log}")]
    ShaderCompile { stage: &'static str, log: String },
    #[error("program failed to link:\n{0}")]
    ProgramLink(String),
    #[error("uniform {0} not found in program")]
    MissingUniform(&'static str),
    #[error("framebuffer incomplete: 0x{0:X}")]
    IncompleteFramebuffer(u32),
    #[error("could not create {what}: {reason}")]
    Resource { what: &'static str, reason: String },
}

impl RenderError {
    pub(crate) fn resource(what: &'static str) -> impl FnOnce(String) -> Self {
        move |reason| Self::Resource { what, reason }
    }
}
