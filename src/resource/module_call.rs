//! Module calls: references to other modules.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::Result;

use super::Reconcile;
use super::status::Status;

/// A reference to another module by source locator.
///
/// The call carries a local name and a flat map of argument values; loading
/// and executing the referenced module is the scheduler's concern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleCall {
    /// Source locator of the referenced module.
    pub source: String,
    /// Local name of the call.
    pub name: String,
    /// Argument name to value mapping.
    pub args: HashMap<String, String>,
}

#[async_trait]
impl Reconcile for ModuleCall {
    fn name(&self) -> &str {
        &self.name
    }

    /// Module calls have no external state of their own.
    async fn check(&self) -> Result<Status> {
        Ok(Status::new(&self.source))
    }

    async fn apply(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_module_call_check_reports_source() {
        let call = ModuleCall {
            source: String::from("modules/base.hcl"),
            name: String::from("base"),
            args: HashMap::from([(String::from("env"), String::from("prod"))]),
        };
        let status = call.check().await.unwrap();
        assert_eq!(status.label, "modules/base.hcl");
        assert!(!status.any_changes());
    }
}
