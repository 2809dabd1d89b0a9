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

use async_trait::async_trait;
use broker_routing::{Collector, Dao, DurabilityError, Record, RetrieveError, StoreOperation};
use std::fmt::Display;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tracing::debug;

const COMPONENT: &str = "json_lines_dao";

///
/// [`JsonLinesDao`] keeps every record of one kind in a single file, one `serde_json`
/// document per line.
///
/// Writes rewrite the whole file into a sibling temp file, sync it and rename it over the
/// original, then sync the directory, so a crash leaves either the old or the new content. Writers are serialized
/// per file; retrieval streams the file line by line.
pub struct JsonLinesDao<T> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> JsonLinesDao<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn error(&self, operation: StoreOperation, reason: impl Display) -> DurabilityError {
        DurabilityError::new(
            T::KIND,
            operation,
            format!("{}: {reason}", self.path.display()),
        )
    }

    fn temp_path(&self) -> PathBuf {
        let mut file_name = self.path.file_name().unwrap_or_default().to_os_string();
        file_name.push(".tmp");
        self.path.with_file_name(file_name)
    }

    async fn read_records(&self, operation: StoreOperation) -> Result<Vec<T>, DurabilityError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(self.error(operation, err)),
        };

        contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                serde_json::from_str(line)
                    .map_err(|err| self.error(operation, format!("line {}: {err}", index + 1)))
            })
            .collect()
    }

    async fn write_records(
        &self,
        records: &[T],
        operation: StoreOperation,
    ) -> Result<(), DurabilityError> {
        let mut contents = String::new();
        for record in records {
            let line = serde_json::to_string(record).map_err(|err| self.error(operation, err))?;
            contents.push_str(&line);
            contents.push('\n');
        }

        let temp_path = self.temp_path();
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .await
            .map_err(|err| self.error(operation, err))?;
        file.write_all(contents.as_bytes())
            .await
            .map_err(|err| self.error(operation, err))?;
        file.sync_all()
            .await
            .map_err(|err| self.error(operation, err))?;
        drop(file);

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|err| self.error(operation, err))?;
        sync_parent_directory(&self.path)
            .await
            .map_err(|err| self.error(operation, err))
    }
}

/// Flushes the directory entry of `path` so a completed rename survives power loss.
#[cfg(unix)]
async fn sync_parent_directory(path: &Path) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    File::open(parent).await?.sync_all().await
}

#[cfg(not(unix))]
async fn sync_parent_directory(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[async_trait]
impl<T: Record> Dao<T> for JsonLinesDao<T> {
    async fn persist(&self, record: &T) -> Result<(), DurabilityError> {
        let _writer = self.write_lock.lock().await;
        let key = record.record_key();

        let mut records = self.read_records(StoreOperation::Persist).await?;
        match records.iter_mut().find(|stored| stored.record_key() == key) {
            Some(stored) => *stored = record.clone(),
            None => records.push(record.clone()),
        }
        self.write_records(&records, StoreOperation::Persist).await?;

        debug!(
            component = COMPONENT,
            entity_kind = %T::KIND,
            record_key = key.as_str(),
            path = %self.path.display(),
            "record persisted"
        );
        Ok(())
    }

    async fn delete(&self, record: &T) -> Result<(), DurabilityError> {
        let _writer = self.write_lock.lock().await;
        let key = record.record_key();

        let mut records = self.read_records(StoreOperation::Delete).await?;
        let before = records.len();
        records.retain(|stored| stored.record_key() != key);
        if records.len() == before {
            return Ok(());
        }
        self.write_records(&records, StoreOperation::Delete).await?;

        debug!(
            component = COMPONENT,
            entity_kind = %T::KIND,
            record_key = key.as_str(),
            path = %self.path.display(),
            "record deleted"
        );
        Ok(())
    }

    async fn retrieve_all(&self, collector: &mut dyn Collector<T>) -> Result<(), RetrieveError> {
        let file = match File::open(&self.path).await {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(self.error(StoreOperation::Retrieve, err).into()),
        };

        let mut lines = BufReader::new(file).lines();
        let mut line_number = 0usize;
        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|err| self.error(StoreOperation::Retrieve, err))?
        {
            line_number += 1;
            if line.trim().is_empty() {
                continue;
            }
            let record: T = serde_json::from_str(&line).map_err(|err| {
                self.error(StoreOperation::Retrieve, format!("line {line_number}: {err}"))
            })?;
            collector.collect(record).map_err(RetrieveError::Rejected)?;
        }
        Ok(())
    }
}
