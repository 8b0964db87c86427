//! Declarative resources and the check/apply contract.
//!
//! Every resource variant implements [`Reconcile`]: a read-only `check`
//! producing a [`Status`], and a mutating `apply` that converges external
//! state toward the declaration. The [`Resource`] enum is the closed set of
//! kinds a module can contain.

mod container;
mod module_call;
mod param;
mod shell;
mod status;
mod template;

pub use container::Container;
pub use module_call::ModuleCall;
pub use param::Param;
pub use shell::ShellTask;
pub use status::{Difference, Severity, Status};
pub use template::Template;

use async_trait::async_trait;

use crate::error::Result;

/// The capability every declarative resource implements.
#[async_trait]
pub trait Reconcile {
    /// Stable identifier used for uniqueness and reporting.
    fn name(&self) -> &str;

    /// Compares declared configuration against observed state.
    ///
    /// Checks are read-only; they must not mutate external state. An error
    /// means the observation itself failed (e.g. the backend was
    /// unreachable) and callers treat it as fatal.
    async fn check(&self) -> Result<Status>;

    /// Converges external state toward the declared configuration.
    ///
    /// Safe to call when `check` reported no differences, though callers
    /// are expected to apply only resources whose check flagged a change.
    async fn apply(&self) -> Result<()>;
}

/// A declarative unit of configuration.
#[derive(Debug, Clone)]
pub enum Resource {
    /// A shell task.
    Task(ShellTask),
    /// A file with declared content.
    Template(Template),
    /// A call to another module.
    Module(ModuleCall),
    /// A module parameter.
    Param(Param),
    /// A container.
    Container(Container),
}

impl Resource {
    /// Returns the keyword naming this resource's kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Task(_) => "task",
            Self::Template(_) => "template",
            Self::Module(_) => "module",
            Self::Param(_) => "param",
            Self::Container(_) => "container",
        }
    }
}

#[async_trait]
impl Reconcile for Resource {
    fn name(&self) -> &str {
        match self {
            Self::Task(r) => r.name(),
            Self::Template(r) => r.name(),
            Self::Module(r) => r.name(),
            Self::Param(r) => r.name(),
            Self::Container(r) => r.name(),
        }
    }

    async fn check(&self) -> Result<Status> {
        match self {
            Self::Task(r) => r.check().await,
            Self::Template(r) => r.check().await,
            Self::Module(r) => r.check().await,
            Self::Param(r) => r.check().await,
            Self::Container(r) => r.check().await,
        }
    }

    async fn apply(&self) -> Result<()> {
        match self {
            Self::Task(r) => r.apply().await,
            Self::Template(r) => r.apply().await,
            Self::Module(r) => r.apply().await,
            Self::Param(r) => r.apply().await,
            Self::Container(r) => r.apply().await,
        }
    }
}

/// The parsed, in-memory representation of one configuration document.
///
/// Built once per parse call and immutable afterwards; owned by the caller.
#[derive(Debug, Clone, Default)]
pub struct Module {
    /// Resources in document order.
    pub resources: Vec<Resource>,
}

impl Module {
    /// Returns the module's declared parameters, in document order.
    #[must_use]
    pub fn params(&self) -> Vec<&Param> {
        self.resources
            .iter()
            .filter_map(|resource| match resource {
                Resource::Param(param) => Some(param),
                _ => None,
            })
            .collect()
    }

    /// Returns true if the module declares no resources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Returns the number of declared resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }
}
