use serde::{Deserialize, Serialize};

/// Number of output axes the renderer consumes (x, y, depth).
pub const AXIS_COUNT: usize = 3;

/// One term of an output axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AxisToken {
    /// `ch1`
    Channel1,
    /// `ch2`
    Channel2,
    /// `t`
    Time,
    /// `1`
    Const1,
    /// `1+2`
    SumChannels,
    /// `1-2`
    DiffChannels,
    Unknown(String),
}

impl AxisToken {
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            "ch1" => AxisToken::Channel1,
            "ch2" => AxisToken::Channel2,
            "t" => AxisToken::Time,
            "1" => AxisToken::Const1,
            "1+2" => AxisToken::SumChannels,
            "1-2" => AxisToken::DiffChannels,
            other => AxisToken::Unknown(other.to_string()),
        }
    }
}

/// Declarative mapping from the x, y and depth axes to signal terms.
///
/// The textual form is three comma-separated axes; an axis may hold several
/// whitespace-separated tokens whose contributions add up, e.g. `"t,ch1 ch2,1"`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AxisSpec {
    axes: [Vec<AxisToken>; AXIS_COUNT],
}

impl AxisSpec {
    pub fn parse(spec: &str) -> Self {
        let mut axes: [Vec<AxisToken>; AXIS_COUNT] = Default::default();
        for (index, axis) in spec.split(',').enumerate() {
            if index >= AXIS_COUNT {
                log::warn!("axis specification {:?} has more than {} axes; ignoring {:?}", spec, AXIS_COUNT, axis);
                continue;
            }
            axes[index] = axis.split_whitespace().map(AxisToken::parse).collect();
        }
        Self { axes }
    }

    pub fn axis(&self, index: usize) -> &[AxisToken] {
        &self.axes[index]
    }

    pub fn axes(&self) -> impl Iterator<Item = (usize, &[AxisToken])> {
        self.axes.iter().enumerate().map(|(i, tokens)| (i, tokens.as_slice()))
    }
}

/// The axis layouts offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AxesMode {
    /// Channel 1 against time.
    #[default]
    At,
    /// Channel 2 against time.
    Bt,
    /// Channel 1 horizontal, channel 2 vertical.
    Xy,
    XyRev,
    /// Mid/side: difference horizontal, sum vertical.
    Stereo,
}

impl AxesMode {
    pub const ALL: [AxesMode; 5] = [AxesMode::At, AxesMode::Bt, AxesMode::Xy, AxesMode::XyRev, AxesMode::Stereo];

    pub fn spec(&self) -> &'static str {
        match self {
            AxesMode::At => "t,ch1,1",
            AxesMode::Bt => "t,ch2,1",
            AxesMode::Xy => "ch1,ch2,t",
            AxesMode::XyRev => "ch2,ch1,t",
            AxesMode::Stereo => "1-2,1+2,t",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AxesMode::At => "AT",
            AxesMode::Bt => "BT",
            AxesMode::Xy => "XY",
            AxesMode::XyRev => "XY Rev",
            AxesMode::Stereo => "Stereo",
        }
    }

    pub fn axis_spec(&self) -> AxisSpec {
        AxisSpec::parse(self.spec())
    }
}
