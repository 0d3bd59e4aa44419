#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod integration;
mod metadata;
mod on_build_finished;
mod payload;
mod trigger_build;

pub mod client;

pub use integration::{Jenkins, WEBHOOK_URL_KEY};
pub use metadata::{JobInfo, JobMetadata};
pub use on_build_finished::{OnBuildFinished, PAYLOAD_TYPE as BUILD_FINISHED_PAYLOAD_TYPE};
pub use payload::{BuildPayload, NotificationPayload, TERMINAL_PHASES};
pub use trigger_build::{PAYLOAD_TYPE as BUILD_QUEUED_PAYLOAD_TYPE, TriggerBuild};
