//! Point-in-time entity snapshot handed to the policy decision point.
//!
//! # Responsibility
//! - Define the flat, PDP-facing entity record shape.
//! - Convert store entities into records and records to/from the PDP's
//!   entity JSON form.
//!
//! # Invariants
//! - At most one record per `Uid`.
//! - Conversions are pure: no store access, no logging, no caching.
//! - Task records use list-scoped ids so tasks of different lists never collide.

use crate::model::entity::{Application, Team, User};
use crate::model::list::List;
use crate::model::uid::{EntityType, Uid};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

const ENTITY_REF_KEY: &str = "__entity";

/// Attribute value understood by the policy decision point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    String(String),
    Long(i64),
    Entity(Uid),
    Set(BTreeSet<Uid>),
}

/// One entity as seen by the policy decision point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRecord {
    pub uid: Uid,
    pub parents: BTreeSet<Uid>,
    pub attrs: BTreeMap<String, AttrValue>,
}

impl EntityRecord {
    pub fn new(uid: Uid) -> Self {
        Self {
            uid,
            parents: BTreeSet::new(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_parents<'a>(mut self, parents: impl IntoIterator<Item = &'a Uid>) -> Self {
        self.parents.extend(parents.into_iter().cloned());
        self
    }

    pub fn with_attr(mut self, name: &str, value: AttrValue) -> Self {
        self.attrs.insert(name.to_string(), value);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }
}

/// Snapshot construction and decoding errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// An entity is stored in a collection that does not match its type.
    WrongEntityType { uid: Uid, expected: EntityType },
    /// A list references a reader/editor team that is not in the store.
    DanglingTeamReference { list: Uid, team: Uid },
    /// Two entities produced the same identifier.
    DuplicateEntity(Uid),
    /// PDP entity JSON could not be decoded.
    InvalidJson(String),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WrongEntityType { uid, expected } => {
                write!(f, "entity {uid} stored as {expected}")
            }
            Self::DanglingTeamReference { list, team } => {
                write!(f, "list {list} references missing team {team}")
            }
            Self::DuplicateEntity(uid) => write!(f, "duplicate entity in snapshot: {uid}"),
            Self::InvalidJson(message) => write!(f, "invalid entity json: {message}"),
        }
    }
}

impl Error for SnapshotError {}

/// Fully materialized view of the entity graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntitySnapshot {
    records: BTreeMap<Uid, EntityRecord>,
}

impl EntitySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one record; a second record for the same uid is rejected.
    pub fn insert(&mut self, record: EntityRecord) -> Result<(), SnapshotError> {
        if self.records.contains_key(&record.uid) {
            return Err(SnapshotError::DuplicateEntity(record.uid));
        }
        self.records.insert(record.uid.clone(), record);
        Ok(())
    }

    pub fn get(&self, uid: &Uid) -> Option<&EntityRecord> {
        self.records.get(uid)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> impl Iterator<Item = &EntityRecord> {
        self.records.values()
    }

    /// Renders the snapshot as the PDP's entity JSON array.
    pub fn to_json(&self) -> Value {
        Value::Array(self.records.values().map(record_to_json).collect())
    }

    /// Parses the PDP's entity JSON array.
    pub fn from_json(value: &Value) -> Result<Self, SnapshotError> {
        let items = value
            .as_array()
            .ok_or_else(|| invalid("top-level value must be an array"))?;
        let mut snapshot = Self::new();
        for item in items {
            snapshot.insert(record_from_json(item)?)?;
        }
        Ok(snapshot)
    }
}

/// Snapshot identifier for the task at `task_id` of `list`.
pub fn snapshot_task_uid(list: &Uid, task_id: usize) -> Uid {
    Uid::new(EntityType::Task, format!("{}/{task_id}", list.id()))
}

pub fn user_record(user: &User) -> EntityRecord {
    EntityRecord::new(user.euid.clone())
        .with_parents(&user.parents)
        .with_attr("location", AttrValue::String(user.location.clone()))
        .with_attr("joblevel", AttrValue::Long(user.job_level))
}

pub fn team_record(team: &Team) -> EntityRecord {
    EntityRecord::new(team.uid.clone()).with_parents(&team.parents)
}

pub fn application_record(app: &Application) -> EntityRecord {
    EntityRecord::new(app.euid.clone())
}

/// Converts a list into its own record followed by one record per task.
pub fn list_records(list: &List) -> (EntityRecord, Vec<EntityRecord>) {
    let task_records: Vec<EntityRecord> = list
        .tasks
        .iter()
        .map(|task| {
            EntityRecord::new(snapshot_task_uid(&list.uid, task.id))
                .with_attr("name", AttrValue::String(task.name.clone()))
                .with_attr("state", AttrValue::String(task.state.as_str().to_string()))
        })
        .collect();

    let task_refs = task_records.iter().map(|record| record.uid.clone()).collect();
    let list_record = EntityRecord::new(list.uid.clone())
        .with_attr("name", AttrValue::String(list.name.clone()))
        .with_attr("owner", AttrValue::Entity(list.owner.clone()))
        .with_attr("readers", AttrValue::Entity(list.readers.clone()))
        .with_attr("editors", AttrValue::Entity(list.editors.clone()))
        .with_attr("tasks", AttrValue::Set(task_refs));

    (list_record, task_records)
}

fn entity_ref_to_json(uid: &Uid) -> Value {
    json!({ "type": uid.entity_type().as_str(), "id": uid.id() })
}

fn attr_to_json(value: &AttrValue) -> Value {
    match value {
        AttrValue::String(text) => Value::String(text.clone()),
        AttrValue::Long(number) => Value::from(*number),
        AttrValue::Entity(uid) => json!({ ENTITY_REF_KEY: entity_ref_to_json(uid) }),
        AttrValue::Set(uids) => Value::Array(
            uids.iter()
                .map(|uid| json!({ ENTITY_REF_KEY: entity_ref_to_json(uid) }))
                .collect(),
        ),
    }
}

fn record_to_json(record: &EntityRecord) -> Value {
    let attrs: Map<String, Value> = record
        .attrs
        .iter()
        .map(|(name, value)| (name.clone(), attr_to_json(value)))
        .collect();
    json!({
        "uid": entity_ref_to_json(&record.uid),
        "parents": record.parents.iter().map(entity_ref_to_json).collect::<Vec<_>>(),
        "attrs": attrs,
    })
}

fn invalid(message: impl Into<String>) -> SnapshotError {
    SnapshotError::InvalidJson(message.into())
}

fn entity_ref_from_json(value: &Value) -> Result<Uid, SnapshotError> {
    let type_name = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(format!("entity reference without `type`: {value}")))?;
    let id = value
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(format!("entity reference without `id`: {value}")))?;
    let entity_type = EntityType::parse(type_name)
        .ok_or_else(|| invalid(format!("unknown entity type `{type_name}`")))?;
    Ok(Uid::new(entity_type, id))
}

fn wrapped_entity_ref_from_json(value: &Value) -> Result<Uid, SnapshotError> {
    let inner = value
        .get(ENTITY_REF_KEY)
        .ok_or_else(|| invalid(format!("expected `{ENTITY_REF_KEY}` wrapper: {value}")))?;
    entity_ref_from_json(inner)
}

fn attr_from_json(value: &Value) -> Result<AttrValue, SnapshotError> {
    match value {
        Value::String(text) => Ok(AttrValue::String(text.clone())),
        Value::Number(number) => number
            .as_i64()
            .map(AttrValue::Long)
            .ok_or_else(|| invalid(format!("attribute number is not an integer: {number}"))),
        Value::Object(_) => wrapped_entity_ref_from_json(value).map(AttrValue::Entity),
        Value::Array(items) => items
            .iter()
            .map(wrapped_entity_ref_from_json)
            .collect::<Result<BTreeSet<_>, _>>()
            .map(AttrValue::Set),
        other => Err(invalid(format!("unsupported attribute value: {other}"))),
    }
}

fn record_from_json(value: &Value) -> Result<EntityRecord, SnapshotError> {
    let uid = entity_ref_from_json(
        value
            .get("uid")
            .ok_or_else(|| invalid("entity without `uid`"))?,
    )?;

    let mut record = EntityRecord::new(uid);
    if let Some(parents) = value.get("parents") {
        let parents = parents
            .as_array()
            .ok_or_else(|| invalid("`parents` must be an array"))?;
        for parent in parents {
            record.parents.insert(entity_ref_from_json(parent)?);
        }
    }
    if let Some(attrs) = value.get("attrs") {
        let attrs = attrs
            .as_object()
            .ok_or_else(|| invalid("`attrs` must be an object"))?;
        for (name, attr) in attrs {
            record.attrs.insert(name.clone(), attr_from_json(attr)?);
        }
    }
    Ok(record)
}
