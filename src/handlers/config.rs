//! Config contract.

use super::HandlerContext;
use crate::error::StoreError;
use crate::models::{ConfigChange, ConfigScope};

pub async fn default_config_updated(
    ctx: &mut HandlerContext<'_>,
    config_type: u8,
    timestamp: u64,
) -> Result<(), StoreError> {
    ctx.batch.save(ConfigChange {
        id: ctx.record_id(),
        scope: ConfigScope::Default,
        new_config: None,
        config_type: Some(config_type),
        timestamp,
    });
    Ok(())
}
