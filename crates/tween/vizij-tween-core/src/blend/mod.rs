//! Blend function registry.
//!
//! The closed set of blend algorithms plus a static metadata table. Functions
//! that only need neighbors from a [`BlendRange`] go through
//! [`BlendFunction::blend_in_range`]; `OffsetTime` additionally needs a
//! snapshot of the original curve and is driven by
//! [`TimeOffsetEvaluator`](crate::offset::TimeOffsetEvaluator).

pub mod functions;

use serde::{Deserialize, Serialize};

use crate::accessor::BlendRange;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendFunction {
    #[default]
    Neighbor,
    PushPull,
    Ease,
    Relative,
    SmoothRough,
    ControlsToTween,
    OffsetTime,
}

/// Static per-variant metadata.
#[derive(Debug)]
pub struct BlendFunctionInfo {
    pub function: BlendFunction,
    /// Stable identifier, matches the serde name.
    pub name: &'static str,
    pub label: &'static str,
    /// Evaluable from a [`BlendRange`] alone.
    pub supports_range_convention: bool,
    /// Needs a buffered copy of the original curve captured at start.
    pub requires_snapshot: bool,
}

static BLEND_FUNCTIONS: [BlendFunctionInfo; 7] = [
    BlendFunctionInfo {
        function: BlendFunction::Neighbor,
        name: "neighbor",
        label: "Blend Neighbor",
        supports_range_convention: true,
        requires_snapshot: false,
    },
    BlendFunctionInfo {
        function: BlendFunction::PushPull,
        name: "push_pull",
        label: "Push Pull",
        supports_range_convention: true,
        requires_snapshot: false,
    },
    BlendFunctionInfo {
        function: BlendFunction::Ease,
        name: "ease",
        label: "Blend Ease",
        supports_range_convention: true,
        requires_snapshot: false,
    },
    BlendFunctionInfo {
        function: BlendFunction::Relative,
        name: "relative",
        label: "Blend Relative",
        supports_range_convention: true,
        requires_snapshot: false,
    },
    BlendFunctionInfo {
        function: BlendFunction::SmoothRough,
        name: "smooth_rough",
        label: "Smooth Rough",
        supports_range_convention: true,
        requires_snapshot: false,
    },
    BlendFunctionInfo {
        function: BlendFunction::ControlsToTween,
        name: "controls_to_tween",
        label: "Tween",
        supports_range_convention: true,
        requires_snapshot: false,
    },
    BlendFunctionInfo {
        function: BlendFunction::OffsetTime,
        name: "offset_time",
        label: "Time Offset",
        supports_range_convention: false,
        requires_snapshot: true,
    },
];

impl BlendFunction {
    pub const ALL: [BlendFunction; 7] = [
        BlendFunction::Neighbor,
        BlendFunction::PushPull,
        BlendFunction::Ease,
        BlendFunction::Relative,
        BlendFunction::SmoothRough,
        BlendFunction::ControlsToTween,
        BlendFunction::OffsetTime,
    ];

    #[inline]
    pub fn info(self) -> &'static BlendFunctionInfo {
        &BLEND_FUNCTIONS[self as usize]
    }

    #[inline]
    pub fn name(self) -> &'static str {
        self.info().name
    }

    #[inline]
    pub fn supports_range_convention(self) -> bool {
        self.info().supports_range_convention
    }

    #[inline]
    pub fn requires_snapshot(self) -> bool {
        self.info().requires_snapshot
    }

    pub fn from_name(name: &str) -> Option<Self> {
        BLEND_FUNCTIONS
            .iter()
            .find(|info| info.name == name)
            .map(|info| info.function)
    }

    /// New value for key `i` of `range`, or `None` when this function needs
    /// more than the range provides.
    pub fn blend_in_range(self, value: f64, range: &BlendRange<'_>, i: usize) -> Option<f64> {
        let current = range.current(i);
        let y = match self {
            BlendFunction::Neighbor => functions::neighbor(
                value,
                range.before_current(i),
                current,
                range.after_current(i),
            ),
            BlendFunction::PushPull => functions::push_pull(
                value,
                range.before_blend_range(),
                current,
                range.after_blend_range(),
            ),
            BlendFunction::Ease => functions::ease(
                value,
                range.before_blend_range(),
                current,
                range.after_blend_range(),
            ),
            BlendFunction::Relative => functions::relative(
                value,
                range.before_blend_range(),
                range.first_in_blend_range(),
                current,
                range.last_in_blend_range(),
                range.after_blend_range(),
            ),
            BlendFunction::SmoothRough => functions::smooth_rough(
                value,
                range.before_current(i),
                current,
                range.after_current(i),
            ),
            BlendFunction::ControlsToTween => functions::controls_to_tween(
                value,
                range.before_blend_range(),
                range.after_blend_range(),
            ),
            BlendFunction::OffsetTime => return None,
        };
        Some(y)
    }
}

impl std::fmt::Display for BlendFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.info().label)
    }
}
