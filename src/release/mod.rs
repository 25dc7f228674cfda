//! Release staging and image builds
//!
//! - [Stage]: resolves the next version and stamps, commits and tags it
//! - [ImageBuild]: builds and pushes one image per distribution

pub mod build;
pub mod stage;
pub mod state;
pub mod steps;

pub use build::{BuildMatrixEntry, BuildOptions, BuildSteps, DefaultBuildSteps, ImageBuild};
pub use stage::{
    godoc_tag_message, release_commit_message, release_tag_message, Stage, DEV_COMMIT_MESSAGE,
};
pub use state::{CommitRange, ReleaseState, StageOptions, StagePhase};
pub use steps::{DefaultStageSteps, StageSteps};
