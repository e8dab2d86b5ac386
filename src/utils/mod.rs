mod maths_utils;
mod perf;
mod time_utils;

pub use maths_utils::{AxisScale, MAX_AXIS_LABELS, round_price, scale_axis};
pub use time_utils::{AppInstant, TimeUtils, epoch_sec_to_utc, format_duration_mins};

pub(crate) use maths_utils::{get_max, get_min};
