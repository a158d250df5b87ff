use crate::error::{require_id, Result};
use std::sync::Arc;

pub type AirportId = Arc<str>;

/// Validated airport code.
pub fn airport_id(field: &str, code: &str) -> Result<AirportId> {
    require_id(field, code)?;
    Ok(Arc::from(code.trim()))
}
