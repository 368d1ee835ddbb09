//! Motion generation: the control-rate planner and the tick-rate executor.

mod executor;
mod planner;

pub use executor::{StepExecutor, DEFAULT_TICK_PERIOD_US};
pub use planner::{ManualState, MotionPlanner, PlannerMode, WaypointMove};
