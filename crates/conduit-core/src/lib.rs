#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;

pub mod component;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod http;
pub mod integration;
pub mod memory;
pub mod prelude;
pub mod registry;
pub mod trigger;
pub mod webhook;

#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;

pub use component::{Component, DEFAULT_OUTPUT_CHANNEL, OutputChannel};
pub use config::{ConfigValue, Configuration, Field, FieldType, decode, decode_metadata};
pub use dispatch::{WebhookBinding, WebhookDelivery, WebhookDispatcher};
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use integration::{Action, Integration, IntegrationResource};
pub use registry::Registry;
pub use trigger::Trigger;
