// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::DataStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use tracing::info;

/// Durable store backed by a sled tree.
#[derive(Clone)]
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Could not create '{}'", path.display()))?;
        let db = sled::open(path)
            .with_context(|| format!("Could not open database at path '{}'", path.display()))?;
        if db.was_recovered() {
            info!("recovered db at: {:?}", path);
        } else {
            info!("created db at: {:?}", path);
        }
        Ok(Self { db })
    }
}

#[async_trait]
impl DataStore for SledStore {
    type Error = anyhow::Error;

    async fn insert<T: Serialize + Send + Sync>(
        &mut self,
        key: &str,
        value: &T,
    ) -> Result<(), Self::Error> {
        self.db
            .insert(key.as_bytes(), bincode::serialize(value)?)
            .context("Could not insert data into db")?;
        self.db.flush_async().await.context("Could not flush db")?;
        Ok(())
    }

    async fn get<T: DeserializeOwned + Send + Sync>(
        &self,
        key: &str,
    ) -> Result<Option<T>, Self::Error> {
        let bytes = self
            .db
            .get(key.as_bytes())
            .with_context(|| format!("Failed to fetch {key}"))?;
        Ok(bytes
            .map(|b| bincode::deserialize(&b))
            .transpose()
            .with_context(|| format!("Could not deserialize value at {key}"))?)
    }
}
