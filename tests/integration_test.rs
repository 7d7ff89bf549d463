#[path = "integration/common/mod.rs"]
mod common;

#[path = "integration/merge_scenarios.rs"]
mod merge_scenarios;

#[path = "integration/gestures.rs"]
mod gestures;

#[path = "integration/regrouping.rs"]
mod regrouping;

#[path = "integration/output_files.rs"]
mod output_files;
