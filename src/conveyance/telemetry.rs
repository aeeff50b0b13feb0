//! Telemetry storage for resolved interactions and disabled-flag changes.
use std::{
    collections::VecDeque,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use bevy::prelude::*;
use serde::{Serialize, Serializer};

use super::{
    behavior::{InputAction, InteractOutcome},
    events::{DisabledChanged, InteractionResolved},
    registry::InteractableId,
};

/// Rolling record of what happened to interactables, newest last.
#[derive(Resource, Debug)]
pub struct InteractionTelemetry {
    capacity: usize,
    records: VecDeque<InteractionTelemetryRecord>,
}

impl InteractionTelemetry {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            records: VecDeque::new(),
        }
    }

    pub fn push(&mut self, record: InteractionTelemetryRecord) {
        while self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn records(&self) -> impl Iterator<Item = &InteractionTelemetryRecord> {
        self.records.iter()
    }

    pub fn latest(&self) -> Option<&InteractionTelemetryRecord> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One telemetry entry; serialized as-is into the JSON-lines log.
#[derive(Debug, Clone, Serialize)]
pub struct InteractionTelemetryRecord {
    pub occurred_at_seconds: f64,
    pub event: InteractionTelemetryEvent,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum InteractionTelemetryEvent {
    Resolved {
        interactable: InteractableId,
        #[serde(serialize_with = "entity_bits")]
        interactor: Entity,
        action: Option<InputAction>,
        outcome: InteractOutcome,
    },
    DisabledChanged {
        interactable: InteractableId,
        disabled: bool,
    },
}

fn entity_bits<S: Serializer>(entity: &Entity, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(entity.to_bits())
}

pub fn record_interaction_telemetry(
    time: Res<Time>,
    mut telemetry: ResMut<InteractionTelemetry>,
    mut log: ResMut<InteractionTelemetryLog>,
    mut resolved: MessageReader<InteractionResolved>,
    mut disabled: MessageReader<DisabledChanged>,
) {
    let occurred_at_seconds = time.elapsed_secs_f64();
    let events = resolved
        .read()
        .map(|message| InteractionTelemetryEvent::Resolved {
            interactable: message.interactable.clone(),
            interactor: message.interactor,
            action: message.action.clone(),
            outcome: message.outcome,
        })
        .chain(
            disabled
                .read()
                .map(|message| InteractionTelemetryEvent::DisabledChanged {
                    interactable: message.interactable.clone(),
                    disabled: message.disabled,
                }),
        );

    for event in events {
        let record = InteractionTelemetryRecord {
            occurred_at_seconds,
            event,
        };
        log.append(&record);
        telemetry.push(record);
    }
}

/// JSON lines encoded as records arrive, appended to disk on flush.
#[derive(Resource, Debug)]
pub struct InteractionTelemetryLog {
    path: PathBuf,
    buffer: String,
    buffered_lines: usize,
}

impl InteractionTelemetryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            buffer: String::new(),
            buffered_lines: 0,
        }
    }

    /// Encodes `record` into the buffer. A record that fails to encode is logged and skipped.
    pub fn append(&mut self, record: &InteractionTelemetryRecord) {
        match serde_json::to_string(record) {
            Ok(line) => {
                self.buffer.push_str(&line);
                self.buffer.push('\n');
                self.buffered_lines += 1;
            }
            Err(err) => warn!("Skipping unencodable telemetry record: {}", err),
        }
    }

    /// Appends the buffered lines to the log file, creating its directory when missing.
    /// Returns how many lines were written.
    pub fn flush(&mut self) -> std::io::Result<usize> {
        if self.buffer.is_empty() {
            return Ok(0);
        }
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?
            .write_all(self.buffer.as_bytes())?;

        self.buffer.clear();
        Ok(std::mem::take(&mut self.buffered_lines))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn buffered_lines(&self) -> usize {
        self.buffered_lines
    }
}

pub fn flush_interaction_telemetry_log(mut log: ResMut<InteractionTelemetryLog>) {
    match log.flush() {
        Ok(0) => {}
        Ok(lines) => trace!("Appended {} telemetry lines to {:?}", lines, log.path()),
        Err(err) => warn!(
            "Interaction telemetry kept in memory, writing {:?} failed: {}",
            log.path(),
            err
        ),
    }
}
