/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! File-backed store for `broker-routing`: one JSON-lines file per record kind inside a
//! single directory.

mod json_lines_dao;

pub use json_lines_dao::JsonLinesDao;

use broker_routing::{BindingRecord, DaoSet, ExchangeRecord, QueueRecord};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

pub const EXCHANGES_FILE: &str = "exchanges.jsonl";
pub const QUEUES_FILE: &str = "queues.jsonl";
pub const BINDINGS_FILE: &str = "bindings.jsonl";

pub struct FileStore {
    directory: PathBuf,
    exchanges: Arc<JsonLinesDao<ExchangeRecord>>,
    queues: Arc<JsonLinesDao<QueueRecord>>,
    bindings: Arc<JsonLinesDao<BindingRecord>>,
}

impl FileStore {
    /// Opens the store rooted at `directory`, creating the directory when missing. Record
    /// files are created on first write.
    pub async fn open(directory: impl AsRef<Path>) -> std::io::Result<Self> {
        let directory = directory.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&directory).await?;

        info!(
            component = "file_store",
            directory = %directory.display(),
            "opened routing store"
        );

        Ok(Self {
            exchanges: Arc::new(JsonLinesDao::new(directory.join(EXCHANGES_FILE))),
            queues: Arc::new(JsonLinesDao::new(directory.join(QUEUES_FILE))),
            bindings: Arc::new(JsonLinesDao::new(directory.join(BINDINGS_FILE))),
            directory,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn dao_set(&self) -> DaoSet {
        DaoSet::new(
            self.exchanges.clone(),
            self.queues.clone(),
            self.bindings.clone(),
        )
    }
}
