//! # Core Module / 核心模块
//!
//! This module contains the core functionality of the runner:
//! data models, settings, the external step seam and the orchestration loop.
//!
//! 此模块包含运行器的核心功能：
//! 数据模型、设置、外部步骤接口以及编排循环。

pub mod config;
pub mod error;
pub mod execution;
pub mod models;
pub mod steps;

// Re-exports
pub use config::OrchestratorConfig;
pub use execution::Orchestrator;
pub use models::{RunResult, RunSummary};
pub use steps::{CommandSteps, StepExecutor};
