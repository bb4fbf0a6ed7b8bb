//! Utility modules shared by the planner and the workflow.

pub mod scan;
