//! Question-and-answer flow
//!
//! Fetches the question list, presents one question at a time, collects one
//! answer per question and submits the complete set for scoring.

mod flow;

pub use flow::{Answer, FlowPhase, FlowSnapshot, InterviewFlow};
