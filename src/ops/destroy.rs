//! Implementation of `ignis destroy`.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::destroy::{self, DestroyerRegistry};

/// Tear down the cluster whose assets live in `dir`.
pub fn destroy_cluster(registry: &DestroyerRegistry, dir: &Path) -> Result<()> {
    let mut destroyer = destroy::new(registry, dir)?;
    destroyer.run().context("failed to destroy cluster")?;
    info!("Cluster destroyed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::destroy::{DestroyError, Destroyer};
    use crate::types::ClusterMetadata;
    use tempfile::TempDir;
    use tracing::Span;

    struct Failing;

    impl Destroyer for Failing {
        fn run(&mut self) -> Result<()> {
            anyhow::bail!("instances still running")
        }
    }

    fn failing(_span: Span, _metadata: &ClusterMetadata) -> Result<Box<dyn Destroyer>> {
        Ok(Box::new(Failing))
    }

    fn write_metadata(dir: &Path) {
        std::fs::write(
            dir.join("metadata.json"),
            r#"{"clusterName":"demo","clusterID":"1234","baremetal":{}}"#,
        )
        .unwrap();
    }

    #[test]
    fn test_destroy_baremetal() {
        let tmp = TempDir::new().unwrap();
        write_metadata(tmp.path());

        destroy_cluster(&DestroyerRegistry::with_builtin(), tmp.path()).unwrap();
    }

    #[test]
    fn test_run_failure_is_reported() {
        let tmp = TempDir::new().unwrap();
        write_metadata(tmp.path());

        let mut registry = DestroyerRegistry::new();
        registry.register("baremetal", failing);

        let err = destroy_cluster(&registry, tmp.path()).unwrap_err();
        assert_eq!(err.to_string(), "failed to destroy cluster");
        assert_eq!(err.root_cause().to_string(), "instances still running");
    }

    #[test]
    fn test_missing_metadata() {
        let tmp = TempDir::new().unwrap();
        let err = destroy_cluster(&DestroyerRegistry::with_builtin(), tmp.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DestroyError>(),
            Some(DestroyError::Metadata { .. })
        ));
    }
}
