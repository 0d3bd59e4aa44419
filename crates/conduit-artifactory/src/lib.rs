#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod delete_artifact;
mod get_artifact_info;
mod integration;
mod location;
mod upload_artifact;

pub mod client;

pub use delete_artifact::{DeleteArtifact, PAYLOAD_TYPE as ARTIFACT_DELETED_PAYLOAD_TYPE};
pub use get_artifact_info::{GetArtifactInfo, PAYLOAD_TYPE as ARTIFACT_INFO_PAYLOAD_TYPE};
pub use integration::JFrogArtifactory;
pub use location::{ArtifactLocation, RepositoryMetadata};
pub use upload_artifact::{PAYLOAD_TYPE as ARTIFACT_UPLOADED_PAYLOAD_TYPE, UploadArtifact};
