// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::PipelineConfig;
use anyhow::{anyhow, bail, Result};
use std::str::FromStr;
use tracing::Level;

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.timeline.window_millis == 0 {
            bail!("timeline.window_millis must be greater than zero");
        }
        if self.aggregation.batch_size == 0 {
            bail!("aggregation.batch_size must be greater than zero");
        }
        if self.cache.capacity == Some(0) {
            bail!("cache.capacity must be greater than zero when set");
        }
        self.log_level()?;
        Ok(())
    }

    pub fn log_level(&self) -> Result<Level> {
        Level::from_str(&self.log_level)
            .map_err(|_| anyhow!("log_level '{}' is not a valid level", self.log_level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_batch_and_capacity() {
        let mut config = PipelineConfig::default();
        config.aggregation.batch_size = 0;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.cache.capacity = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unknown_log_level() {
        let mut config = PipelineConfig::default();
        config.log_level = "loud".to_string();
        assert!(config.validate().is_err());
    }
}
