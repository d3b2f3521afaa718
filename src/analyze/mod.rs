// src/analyze/mod.rs
//! Signal gatherers and the blender: heuristics, AI-likelihood, generative
//! commentary and the score itself.

pub mod ai_adapter;
pub mod ai_likelihood;
pub mod heuristics;
pub mod scoring;

// Re-export convenient types.
pub use crate::analyze::ai_likelihood::{estimate, AiLikelihoodEstimate};
pub use crate::analyze::heuristics::{detect, HeuristicFlag};
pub use crate::analyze::scoring::{blend, blend_breakdown, verdict, Breakdown};
