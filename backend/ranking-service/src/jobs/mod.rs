// ============================================
// Background Jobs Module (後台任務模組)
// ============================================
//
// Contains background job runners for:
// 1. Score and rank recomputation over the whole board
//
// These jobs can be triggered via:
// - CronJob (Kubernetes)
// - Command line argument (--mode recompute)

pub mod recompute;

pub use recompute::{RecomputeJob, RecomputeStats};
