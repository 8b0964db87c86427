//! Module parameters.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;

use super::Reconcile;
use super::status::Status;

/// An input to a module: a name plus a default value.
///
/// Argument resolution happens in the caller; at this layer a parameter
/// carries its declared default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Param {
    /// Parameter name, taken from the block label.
    #[serde(skip)]
    pub name: String,
    /// Default value used when the caller supplies no argument.
    #[serde(default)]
    pub default: String,
}

impl Param {
    /// Returns the parameter's value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.default
    }
}

#[async_trait]
impl Reconcile for Param {
    fn name(&self) -> &str {
        &self.name
    }

    /// Parameters never change external state; the status shows the value.
    async fn check(&self) -> Result<Status> {
        Ok(Status::new(self.value()))
    }

    async fn apply(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_param_check_is_a_no_op() {
        let param = Param {
            name: String::from("region"),
            default: String::from("eu-west-1"),
        };
        let status = param.check().await.unwrap();
        assert_eq!(status.label, "eu-west-1");
        assert!(!status.will_change);
        assert!(status.differences.is_empty());
    }
}
