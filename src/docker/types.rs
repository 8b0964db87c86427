//! Docker Engine API types and data structures.
//!
//! This module defines the wire types consumed by the container client and
//! the diff engine. The engine emits `null` for absent lists and maps, so
//! those fields deserialize through [`null_as_default`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An exposed-port set: canonical `port/proto` keys mapped to empty objects.
pub type PortSet = BTreeMap<String, Empty>;

/// A published-port map: canonical `port/proto` keys mapped to host bindings.
pub type BindingMap = BTreeMap<String, Vec<PortBinding>>;

/// Marker for the engine's empty-object map values (e.g. `{"80/tcp": {}}`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

/// Deserializes engine `null` values as the field type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A container port spec such as `8080/tcp`.
///
/// The protocol part is optional in user input and defaults to `tcp`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Port(String);

impl Port {
    /// Wraps a raw port spec.
    #[must_use]
    pub fn new(spec: impl Into<String>) -> Self {
        Self(spec.into())
    }

    /// Returns the port number part of the spec.
    #[must_use]
    pub fn port(&self) -> &str {
        match self.0.split_once('/') {
            Some((port, _)) => port,
            None => &self.0,
        }
    }

    /// Returns the protocol part of the spec, defaulting to `tcp`.
    #[must_use]
    pub fn proto(&self) -> &str {
        match self.0.split_once('/') {
            Some((_, proto)) => proto,
            None => "tcp",
        }
    }

    /// Returns the canonical `port/proto` form.
    #[must_use]
    pub fn canonical(&self) -> String {
        format!("{}/{}", self.port(), self.proto())
    }
}

impl std::fmt::Display for Port {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

/// Shared runtime configuration carried by both containers and images.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EngineConfig {
    /// Environment variables as `KEY=VALUE` strings.
    #[serde(deserialize_with = "null_as_default")]
    pub env: Vec<String>,
    /// Command arguments.
    #[serde(deserialize_with = "null_as_default")]
    pub cmd: Vec<String>,
    /// Entrypoint arguments.
    #[serde(deserialize_with = "null_as_default")]
    pub entrypoint: Vec<String>,
    /// Working directory inside the container.
    #[serde(deserialize_with = "null_as_default")]
    pub working_dir: String,
    /// Exposed ports in canonical `port/proto` form.
    #[serde(deserialize_with = "null_as_default")]
    pub exposed_ports: PortSet,
}

/// Host-level configuration of a container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct HostConfig {
    /// Whether all exposed ports are published to random host ports.
    pub publish_all_ports: bool,
    /// Links to other containers.
    #[serde(deserialize_with = "null_as_default")]
    pub links: Vec<String>,
    /// Published port bindings keyed by container port.
    #[serde(deserialize_with = "null_as_default")]
    pub port_bindings: BindingMap,
}

/// A single host-side port binding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortBinding {
    /// Host IP address, empty when unbound.
    #[serde(rename = "HostIp", deserialize_with = "null_as_default")]
    pub host_ip: String,
    /// Host port, empty when the engine assigns one.
    #[serde(rename = "HostPort", deserialize_with = "null_as_default")]
    pub host_port: String,
}

/// Run state of a container, from the inspect endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ContainerState {
    /// State string such as `running` or `exited`.
    pub status: String,
}

/// A container summary from the list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ContainerSummary {
    /// Container identifier.
    pub id: String,
    /// Names attached to the container, each prefixed with `/`.
    #[serde(deserialize_with = "null_as_default")]
    pub names: Vec<String>,
    /// Image reference the container was created from.
    pub image: String,
    /// Coarse state string.
    pub state: String,
}

/// A live container, from the inspect endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ContainerDetails {
    /// Container identifier.
    pub id: String,
    /// Container name, prefixed with `/`.
    pub name: String,
    /// Identifier of the image backing the container.
    pub image: String,
    /// Run state.
    pub state: ContainerState,
    /// Runtime configuration.
    pub config: EngineConfig,
    /// Host configuration; the engine may omit it.
    pub host_config: Option<HostConfig>,
}

impl ContainerDetails {
    /// Returns the container name without its leading `/`.
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.name.trim_start_matches('/')
    }
}

/// An image, from the image inspect endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Image {
    /// Image identifier.
    pub id: String,
    /// Repo tags attached to the image; a single image may carry several.
    #[serde(deserialize_with = "null_as_default")]
    pub repo_tags: Vec<String>,
    /// Default runtime configuration baked into the image.
    pub config: EngineConfig,
}

/// Request to create a new container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateRequest {
    /// Container name; sent as a query parameter, not in the body.
    #[serde(skip)]
    pub name: String,
    /// Image reference.
    pub image: String,
    /// Working directory, inherited from the image when empty.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub working_dir: String,
    /// Environment variables as `KEY=VALUE` strings.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<String>,
    /// Exposed ports in canonical `port/proto` form.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub exposed_ports: PortSet,
    /// Command arguments; `None` inherits the image default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd: Option<Vec<String>>,
    /// Entrypoint arguments; `None` inherits the image default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<Vec<String>>,
    /// Host-level configuration.
    pub host_config: HostConfig,
}

/// Response from the container create endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CreateResponse {
    /// Identifier of the created container.
    pub id: String,
    /// Warnings emitted during creation.
    #[serde(deserialize_with = "null_as_default")]
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_defaults_to_tcp() {
        let port = Port::new("8080");
        assert_eq!(port.port(), "8080");
        assert_eq!(port.proto(), "tcp");
        assert_eq!(port.canonical(), "8080/tcp");
    }

    #[test]
    fn test_port_keeps_explicit_proto() {
        let port = Port::new("53/udp");
        assert_eq!(port.port(), "53");
        assert_eq!(port.proto(), "udp");
        assert_eq!(port.canonical(), "53/udp");
    }

    #[test]
    fn test_null_fields_deserialize_as_empty() {
        let json = r#"{
            "Id": "abc",
            "Name": "/web",
            "Image": "sha256:deadbeef",
            "State": {"Status": "running"},
            "Config": {"Env": null, "Cmd": null, "Entrypoint": null, "ExposedPorts": null},
            "HostConfig": {"Links": null, "PortBindings": null, "PublishAllPorts": false}
        }"#;
        let details: ContainerDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.short_name(), "web");
        assert!(details.config.env.is_empty());
        assert!(details.config.cmd.is_empty());
        let host = details.host_config.unwrap();
        assert!(host.links.is_empty());
        assert!(host.port_bindings.is_empty());
    }

    #[test]
    fn test_create_request_omits_empty_fields() {
        let request = CreateRequest {
            name: String::from("web"),
            image: String::from("nginx:latest"),
            ..CreateRequest::default()
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["Image"], "nginx:latest");
        assert!(body.get("Name").is_none());
        assert!(body.get("Env").is_none());
        assert!(body.get("Cmd").is_none());
        assert!(body.get("WorkingDir").is_none());
        assert!(body.get("HostConfig").is_some());
    }

    #[test]
    fn test_create_request_serializes_bindings() {
        let mut bindings = BindingMap::new();
        bindings.insert(
            String::from("8080/tcp"),
            vec![PortBinding {
                host_ip: String::new(),
                host_port: String::from("80"),
            }],
        );
        let request = CreateRequest {
            name: String::from("web"),
            image: String::from("nginx:latest"),
            host_config: HostConfig {
                publish_all_ports: true,
                links: vec![String::from("db")],
                port_bindings: bindings,
            },
            ..CreateRequest::default()
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["HostConfig"]["PublishAllPorts"], true);
        assert_eq!(body["HostConfig"]["PortBindings"]["8080/tcp"][0]["HostPort"], "80");
    }
}
