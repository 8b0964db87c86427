//! Container resources and their diff engine.
//!
//! A container's check retrieves the live container and its source image
//! through the injected [`ContainerClient`] and computes a normalized,
//! order-independent difference per attribute. Apply issues a single
//! create request built from the declared configuration.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

use crate::docker::{
    BindingMap, ContainerClient, ContainerDetails, CreateRequest, Empty, HostConfig, Image, Port,
    PortBinding, PortSet,
};
use crate::error::{Result, StewardError};

use super::Reconcile;
use super::status::Status;

/// Run state a reconciled container is expected to reach.
const RUNNING: &str = "running";

/// Default value recorded when no container with the declared name exists.
const CONTAINER_MISSING: &str = "<container-missing>";

/// A container whose desired configuration is declared in a module.
///
/// The runtime-client handle is not part of the declaration; it is injected
/// with [`Container::set_client`] before the resource is checked or applied.
#[derive(Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Container {
    /// Container name, taken from the block label.
    #[serde(skip)]
    pub name: String,
    /// Image reference to run.
    pub image: String,
    /// Entrypoint override; empty inherits the image default.
    #[serde(default)]
    pub entrypoint: String,
    /// Command override; empty inherits the image default.
    #[serde(default)]
    pub command: String,
    /// Working directory; empty inherits the image default.
    #[serde(default)]
    pub working_dir: String,
    /// Environment variables as `KEY=VALUE` strings.
    #[serde(default)]
    pub env: Vec<String>,
    /// Ports to expose, each `port` or `port/proto`.
    #[serde(default)]
    pub expose: Vec<String>,
    /// Links to other containers, each `name` or `name:alias`.
    #[serde(default)]
    pub links: Vec<String>,
    /// Published port mappings; see [`Container::port_binding_map`].
    #[serde(default)]
    pub ports: Vec<String>,
    /// Whether to publish all exposed ports to random host ports.
    #[serde(default)]
    pub publish_all_ports: bool,
    #[serde(skip)]
    client: Option<Arc<dyn ContainerClient>>,
}

impl Container {
    /// Injects the runtime-client capability.
    pub fn set_client(&mut self, client: Arc<dyn ContainerClient>) {
        self.client = Some(client);
    }

    /// Builder form of [`Container::set_client`].
    #[must_use]
    pub fn with_client(mut self, client: Arc<dyn ContainerClient>) -> Self {
        self.set_client(client);
        self
    }

    /// Returns the injected client, or an error when none was attached.
    fn client(&self) -> Result<&dyn ContainerClient> {
        self.client
            .as_deref()
            .ok_or_else(|| StewardError::MissingClient {
                name: self.name.clone(),
            })
    }

    /// Records one difference per attribute category against a live container.
    fn diff_container(&self, live: &ContainerDetails, image: &Image, status: &mut Status) {
        status.add_difference("name", live.short_name(), &self.name, "");
        status.add_difference("status", &live.state.status, RUNNING, "");

        if let Some(host) = &live.host_config {
            status.add_difference(
                "publish_all_ports",
                host.publish_all_ports.to_string(),
                self.publish_all_ports.to_string(),
                "false",
            );
        }

        // Empty declarations compare against the image's own defaults.
        let actual = live.config.cmd.join(" ");
        let expected = if self.command.is_empty() {
            image.config.cmd.join(" ")
        } else {
            self.command.clone()
        };
        status.add_difference("command", actual, expected, "");

        let actual = live.config.entrypoint.join(" ");
        let expected = if self.entrypoint.is_empty() {
            image.config.entrypoint.join(" ")
        } else {
            self.entrypoint.clone()
        };
        status.add_difference("entrypoint", actual, expected, "");

        let actual = live.config.working_dir.clone();
        let expected = if self.working_dir.is_empty() {
            image.config.working_dir.clone()
        } else {
            self.working_dir.clone()
        };
        status.add_difference("working_dir", actual, expected, "");

        let (actual, expected) = self.compare_env(live, image);
        status.add_difference("env", actual, expected, "");

        let (actual, expected) = self.compare_port_mappings(live);
        status.add_difference("ports", actual, expected, "");

        let (actual, expected) = self.compare_exposed_ports(live, image);
        status.add_difference("expose", actual, expected, "");

        let (actual, expected) = self.compare_links(live);
        status.add_difference("links", actual, expected, "");

        status.add_difference("image", preferred_repo_tag(&self.image, image), &self.image, "");
    }

    /// Compares environment variables as sets of `KEY=VALUE` strings.
    ///
    /// Variables the image itself injects are excluded from the observed
    /// side so image-inherited defaults don't show up as drift.
    fn compare_env(&self, live: &ContainerDetails, image: &Image) -> (String, String) {
        let live_set: BTreeSet<&str> = live.config.env.iter().map(String::as_str).collect();
        let image_set: BTreeSet<&str> = image.config.env.iter().map(String::as_str).collect();
        let declared: BTreeSet<&str> = self.env.iter().map(String::as_str).collect();

        let actual: Vec<&str> = live_set.difference(&image_set).copied().collect();
        let expected: Vec<&str> = declared.into_iter().collect();

        (actual.join(" "), expected.join(" "))
    }

    /// Compares exposed-port sets in canonical `port/proto` form.
    ///
    /// An image's inherent exposed ports are always expected, declared or not.
    fn compare_exposed_ports(&self, live: &ContainerDetails, image: &Image) -> (String, String) {
        let live_set = canonical_keys(&live.config.exposed_ports);
        let image_set = canonical_keys(&image.config.exposed_ports);
        let declared = canonical_specs(&self.expose);

        let expected: BTreeSet<String> = declared.union(&image_set).cloned().collect();

        (join_sorted(&live_set), join_sorted(&expected))
    }

    /// Compares published port bindings as canonical sorted lists.
    fn compare_port_mappings(&self, live: &ContainerDetails) -> (String, String) {
        let Some(host) = &live.host_config else {
            return (String::new(), String::new());
        };

        let actual = bindings_list(&host.port_bindings).join(", ");
        let expected = bindings_list(&self.port_binding_map()).join(", ");
        (actual, expected)
    }

    /// Compares link sets after normalizing the engine's internal encoding.
    fn compare_links(&self, live: &ContainerDetails) -> (String, String) {
        let Some(host) = &live.host_config else {
            return (String::new(), String::new());
        };

        let actual: BTreeSet<String> = host.links.iter().map(|l| normalize_link(l)).collect();
        let expected: BTreeSet<String> = self.links.iter().cloned().collect();

        (join_sorted(&actual), join_sorted(&expected))
    }

    /// Parses the declared port-mapping specs into a binding map.
    ///
    /// A spec is 1, 2, or 3 colon-separated fields: `containerPort`,
    /// `hostPort:containerPort`, or `hostIP:hostPort:containerPort`. The
    /// container port defaults its protocol to `tcp`. Blank specs produce
    /// no binding.
    #[must_use]
    pub fn port_binding_map(&self) -> BindingMap {
        let mut bindings = BindingMap::new();

        for mapping in &self.ports {
            if mapping.trim().is_empty() {
                debug!("Skipping blank port mapping on container {}", self.name);
                continue;
            }

            let parts: Vec<&str> = mapping.split(':').collect();
            let (host_ip, host_port, container_port) = match parts.as_slice() {
                [cport] => ("", "", *cport),
                [hport, cport] => ("", *hport, *cport),
                [ip, hport, cport, ..] => (*ip, *hport, *cport),
                [] => continue,
            };

            let key = Port::new(container_port).canonical();
            bindings.entry(key).or_default().push(PortBinding {
                host_ip: host_ip.to_string(),
                host_port: host_port.to_string(),
            });
        }

        bindings
    }
}

#[async_trait]
impl Reconcile for Container {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> Result<Status> {
        let mut status = Status::new(&self.name);
        let client = self.client()?;

        let container = client
            .find_container(&self.name)
            .await
            .map_err(StewardError::Docker)?;

        match container {
            Some(live) => {
                let image = client.find_image(&live.image).await.map_err(|source| {
                    StewardError::ImageLookup {
                        image: live.image.clone(),
                        container: live.short_name().to_string(),
                        source,
                    }
                })?;
                self.diff_container(&live, &image, &mut status);
            }
            None => status.add_difference("name", "", &self.name, CONTAINER_MISSING),
        }

        status.settle();
        Ok(status)
    }

    async fn apply(&self) -> Result<()> {
        let request = CreateRequest {
            name: self.name.clone(),
            image: self.image.clone(),
            working_dir: self.working_dir.clone(),
            env: self.env.clone(),
            exposed_ports: to_port_map(&self.expose),
            cmd: split_args(&self.command),
            entrypoint: split_args(&self.entrypoint),
            host_config: HostConfig {
                publish_all_ports: self.publish_all_ports,
                links: self.links.clone(),
                port_bindings: self.port_binding_map(),
            },
        };

        let id = self
            .client()?
            .create_container(&request)
            .await
            .map_err(|source| StewardError::ContainerRun {
                name: self.name.clone(),
                source,
            })?;

        debug!("Created container {} ({id})", self.name);
        Ok(())
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("name", &self.name)
            .field("image", &self.image)
            .field("entrypoint", &self.entrypoint)
            .field("command", &self.command)
            .field("working_dir", &self.working_dir)
            .field("env", &self.env)
            .field("expose", &self.expose)
            .field("links", &self.links)
            .field("ports", &self.ports)
            .field("publish_all_ports", &self.publish_all_ports)
            .finish_non_exhaustive()
    }
}

/// Canonicalizes an exposed-port map's keys.
fn canonical_keys(ports: &PortSet) -> BTreeSet<String> {
    ports
        .keys()
        .map(|key| Port::new(key.as_str()).canonical())
        .collect()
}

/// Canonicalizes declared port specs.
fn canonical_specs(specs: &[String]) -> BTreeSet<String> {
    specs
        .iter()
        .map(|spec| Port::new(spec.as_str()).canonical())
        .collect()
}

/// Builds an exposed-port map from declared specs.
fn to_port_map(specs: &[String]) -> PortSet {
    specs
        .iter()
        .map(|spec| (Port::new(spec.as_str()).canonical(), Empty {}))
        .collect()
}

/// Joins an already-sorted set for display.
fn join_sorted(set: &BTreeSet<String>) -> String {
    set.iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Flattens a binding map into sorted `hostIP:hostPort/proto:cport/proto`
/// entries so comparisons are insensitive to map iteration order.
fn bindings_list(bindings: &BindingMap) -> Vec<String> {
    let mut entries = Vec::new();

    for (port, port_bindings) in bindings {
        let port = Port::new(port.as_str());
        let proto = port.proto();
        let container_port = format!("{}/{proto}", port.port());

        for binding in port_bindings {
            let host_port = if binding.host_port.is_empty() {
                String::new()
            } else {
                let bare = binding.host_port.split('/').next().unwrap_or_default();
                format!("{bare}/{proto}")
            };
            entries.push(format!("{}:{host_port}:{container_port}", binding.host_ip));
        }
    }

    entries.sort();
    entries
}

/// Normalizes a link to `name` or `name:alias`.
///
/// Live containers report links in the engine's internal encoding,
/// `/linkedName:/containerName/alias`. An alias equal to the name
/// (case-insensitively) collapses to the bare name.
fn normalize_link(link: &str) -> String {
    let parts: Vec<&str> = link.split(':').collect();
    if parts.len() == 1 {
        return link.trim_start_matches('/').to_string();
    }

    let (name, alias) = if let Some(stripped) = parts[0].strip_prefix('/') {
        let alias = parts[1].rsplit('/').next().unwrap_or_default();
        (stripped, alias)
    } else {
        (parts[0], parts[1])
    };

    if name.eq_ignore_ascii_case(alias) {
        name.to_string()
    } else {
        format!("{name}:{alias}")
    }
}

/// Chooses the live repo tag to display for an image.
///
/// A single image can carry several tags; prefer the one matching the
/// declared reference case-insensitively, falling back to the first.
fn preferred_repo_tag(want: &str, image: &Image) -> String {
    image
        .repo_tags
        .iter()
        .find(|tag| tag.eq_ignore_ascii_case(want))
        .or_else(|| image.repo_tags.first())
        .cloned()
        .unwrap_or_default()
}

/// Splits a declared command string into arguments, `None` when empty.
fn split_args(command: &str) -> Option<Vec<String>> {
    if command.is_empty() {
        None
    } else {
        Some(command.split(' ').map(str::to_string).collect())
    }
}
