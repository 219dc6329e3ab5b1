//! Workflow orchestration for appstore-publisher

mod publish;

pub use publish::*;
