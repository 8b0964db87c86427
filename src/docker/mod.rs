//! Docker Engine integration module.
//!
//! This module provides the runtime-client capability the container
//! resource reconciles through: the [`ContainerClient`] trait, its HTTP
//! implementation, and the Engine API wire types.

mod client;
mod types;

pub use client::{ContainerClient, EngineClient};
pub use types::{
    BindingMap, ContainerDetails, ContainerState, ContainerSummary, CreateRequest, CreateResponse,
    Empty, EngineConfig, HostConfig, Image, Port, PortBinding, PortSet,
};

#[cfg(test)]
pub use client::MockContainerClient;
