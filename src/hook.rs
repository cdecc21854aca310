//! Provisioning hook seam.

use async_trait::async_trait;

use crate::driver::HypervDriver;
use crate::errors::ForgeResult;
use crate::ui::Ui;

/// User-supplied guest provisioning, invoked once the machine is reachable.
///
/// The pipeline treats the hook as opaque: any error it returns halts the
/// build with that error recorded.
#[async_trait]
pub trait ProvisionHook: Send + Sync {
    async fn provision(&self, ui: &dyn Ui, driver: &dyn HypervDriver) -> ForgeResult<()>;
}
