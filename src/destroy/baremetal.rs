//! Bare metal teardown.
//!
//! Nothing is provisioned on bare metal, so there is nothing to delete.

use anyhow::Result;
use tracing::{debug, Span};

use crate::destroy::Destroyer;
use crate::types::ClusterMetadata;

pub const PLATFORM: &str = "baremetal";

/// Uninstaller for a bare metal cluster.
#[derive(Debug)]
pub struct ClusterUninstaller {
    span: Span,
}

impl Destroyer for ClusterUninstaller {
    fn run(&mut self) -> Result<()> {
        let _enter = self.span.enter();
        debug!("Deleting bare metal resources");
        Ok(())
    }
}

pub fn new(span: Span, _metadata: &ClusterMetadata) -> Result<Box<dyn Destroyer>> {
    Ok(Box::new(ClusterUninstaller { span }))
}
