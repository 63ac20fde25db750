pub mod axis;
pub mod buffer;
pub mod error;
pub mod kernel;
pub mod memo;
pub mod parameter;
pub mod projection;
pub mod scheduler;
pub mod scope;
pub mod trigger;

pub use axis::{AxesMode, AxisSpec, AxisToken};
pub use buffer::{NoTexture, SampleRingBuffer, SampleTexture, WrittenRange, CHANNELS};
pub use error::{ConfigError, IngestError};
pub use kernel::{blur_kernel, KERNEL_DIAMETER, KERNEL_RADIUS};
pub use parameter::{ParamRange, ParameterChanges, ScopeParameters, HISTORY_SIZES};
pub use projection::{AxisProjector, ProjectionInputs, ProjectionState};
pub use scheduler::RedrawScheduler;
pub use scope::{FramePlan, IngestOutcome, Primitive, Scope, SurfaceSize, Sweep, INTERP_SCALE};
pub use trigger::{ScanStats, TriggerDetector, TriggerRecord, TRIGGER_SLOTS};
