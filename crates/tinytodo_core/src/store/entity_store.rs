//! In-memory entity graph store.
//!
//! # Responsibility
//! - Own the User, Team and List collections plus the Application singleton.
//! - Allocate store-assigned List/Team ids.
//! - Load the entity fixture and build PDP snapshots.
//!
//! # Invariants
//! - Collections are keyed by the entity's own `Uid`.
//! - List and Team numeric ids share one pool: a new id is the smallest
//!   non-negative integer used by no List and no Team.
//! - The store does no locking; callers serialize access (see `TodoService`).
//!
//! # See also
//! - `store::snapshot` for the PDP-facing record shape.

use crate::model::entity::{Application, Team, User};
use crate::model::list::List;
use crate::model::uid::{parse_uid, EntityType, Uid, UidParseError};
use crate::store::snapshot::{
    application_record, list_records, team_record, user_record, EntitySnapshot, SnapshotError,
};
use log::{error, info};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type StoreResult<T> = Result<T, StoreError>;

/// Fixture loading error.
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Json(serde_json::Error),
    InvalidKey { key: String, source: UidParseError },
    KeyMismatch { key: String, value: Uid },
    WrongEntityType { uid: Uid, expected: EntityType },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read entities: {err}"),
            Self::Json(err) => write!(f, "failed to parse entities: {err}"),
            Self::InvalidKey { key, source } => {
                write!(f, "invalid entity key `{key}`: {source}")
            }
            Self::KeyMismatch { key, value } => {
                write!(f, "entity key `{key}` does not match embedded uid {value}")
            }
            Self::WrongEntityType { uid, expected } => {
                write!(f, "entity {uid} found where {expected} was expected")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::InvalidKey { source, .. } => Some(source),
            Self::KeyMismatch { .. } | Self::WrongEntityType { .. } => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Deserialize)]
struct EntityFixture {
    #[serde(default)]
    users: BTreeMap<String, User>,
    #[serde(default)]
    teams: BTreeMap<String, Team>,
    #[serde(default)]
    lists: BTreeMap<String, List>,
    app: Application,
}

/// Typed entity collections and the `parents` relation between them.
#[derive(Debug, Clone)]
pub struct EntityStore {
    users: BTreeMap<Uid, User>,
    teams: BTreeMap<Uid, Team>,
    lists: BTreeMap<Uid, List>,
    app: Application,
}

impl EntityStore {
    /// Creates an empty store around `app`.
    pub fn new(app: Application) -> Self {
        Self {
            users: BTreeMap::new(),
            teams: BTreeMap::new(),
            lists: BTreeMap::new(),
            app,
        }
    }

    /// Reads the entity fixture at `path`.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| {
            error!(
                "event=entities_load module=store status=error path={} error={}",
                path.display(),
                err
            );
            StoreError::Io(err)
        })?;
        Self::from_json(&text)
    }

    /// Parses the entity fixture document.
    ///
    /// # Errors
    /// - `Json` for malformed documents.
    /// - `InvalidKey` / `KeyMismatch` when a map key is not the entity's own uid.
    /// - `WrongEntityType` when an entity sits in the wrong collection.
    pub fn from_json(text: &str) -> StoreResult<Self> {
        let fixture: EntityFixture = serde_json::from_str(text)?;
        expect_type(&fixture.app.euid, EntityType::Application)?;

        let mut store = Self::new(fixture.app);
        for (key, user) in fixture.users {
            checked_key(&key, &user.euid, EntityType::User)?;
            store.users.insert(user.euid.clone(), user);
        }
        for (key, team) in fixture.teams {
            checked_key(&key, &team.uid, EntityType::Team)?;
            store.teams.insert(team.uid.clone(), team);
        }
        for (key, mut list) in fixture.lists {
            checked_key(&key, &list.uid, EntityType::List)?;
            list.normalize_task_ids();
            store.lists.insert(list.uid.clone(), list);
        }

        info!(
            "event=entities_load module=store status=ok users={} teams={} lists={}",
            store.users.len(),
            store.teams.len(),
            store.lists.len()
        );
        Ok(store)
    }

    pub fn application(&self) -> &Application {
        &self.app
    }

    pub fn application_uid(&self) -> &Uid {
        &self.app.euid
    }

    pub fn user(&self, uid: &Uid) -> Option<&User> {
        self.users.get(uid)
    }

    pub fn team(&self, uid: &Uid) -> Option<&Team> {
        self.teams.get(uid)
    }

    pub fn list(&self, uid: &Uid) -> Option<&List> {
        self.lists.get(uid)
    }

    pub fn list_mut(&mut self, uid: &Uid) -> Option<&mut List> {
        self.lists.get_mut(uid)
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn teams(&self) -> impl Iterator<Item = &Team> {
        self.teams.values()
    }

    /// Lists in ascending uid order.
    pub fn lists(&self) -> impl Iterator<Item = &List> {
        self.lists.values()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    pub fn list_count(&self) -> usize {
        self.lists.len()
    }

    /// Inserts or replaces a user.
    pub fn insert_user(&mut self, user: User) -> Option<User> {
        self.users.insert(user.euid.clone(), user)
    }

    /// Inserts or replaces a team.
    pub fn insert_team(&mut self, team: Team) -> Option<Team> {
        self.teams.insert(team.uid.clone(), team)
    }

    /// Smallest unused id as a `List` uid. Nothing is inserted.
    pub fn allocate_list_id(&self) -> Uid {
        Uid::new(EntityType::List, self.next_free_id(None).to_string())
    }

    /// Allocates the smallest unused id and inserts an empty Team under it.
    pub fn allocate_team_id(&mut self) -> Uid {
        self.insert_fresh_team(None)
    }

    /// Creates a List owned by `owner` with fresh reader and editor teams.
    ///
    /// The list id is taken first, then the two team ids, so an empty store
    /// yields `List::"0"`, `Team::"1"`, `Team::"2"`.
    pub fn create_list(&mut self, name: impl Into<String>, owner: Uid) -> Uid {
        let list_id = self.next_free_id(None);
        let readers = self.insert_fresh_team(Some(list_id));
        let editors = self.insert_fresh_team(Some(list_id));
        let uid = Uid::new(EntityType::List, list_id.to_string());

        self.lists.insert(
            uid.clone(),
            List::new(uid.clone(), name, owner, readers, editors),
        );
        uid
    }

    /// Removes a list. Its reader/editor teams stay in place.
    pub fn remove_list(&mut self, uid: &Uid) -> Option<List> {
        self.lists.remove(uid)
    }

    /// `parents` of the Team or User named by `uid`, Teams checked first.
    pub fn parents_mut(&mut self, uid: &Uid) -> Option<&mut Vec<Uid>> {
        if let Some(team) = self.teams.get_mut(uid) {
            return Some(&mut team.parents);
        }
        self.users.get_mut(uid).map(|user| &mut user.parents)
    }

    /// Materializes the whole graph as PDP records.
    ///
    /// # Errors
    /// - `WrongEntityType` when a collection holds an entity of another type.
    /// - `DanglingTeamReference` when a list names a missing reader/editor team.
    /// - `DuplicateEntity` when two entities map to the same uid.
    pub fn snapshot(&self) -> Result<EntitySnapshot, SnapshotError> {
        let mut snapshot = EntitySnapshot::new();

        snapshot_type(&self.app.euid, EntityType::Application)?;
        snapshot.insert(application_record(&self.app))?;

        for user in self.users.values() {
            snapshot_type(&user.euid, EntityType::User)?;
            snapshot.insert(user_record(user))?;
        }
        for team in self.teams.values() {
            snapshot_type(&team.uid, EntityType::Team)?;
            snapshot.insert(team_record(team))?;
        }
        for list in self.lists.values() {
            snapshot_type(&list.uid, EntityType::List)?;
            for team in [&list.readers, &list.editors] {
                if !self.teams.contains_key(team) {
                    return Err(SnapshotError::DanglingTeamReference {
                        list: list.uid.clone(),
                        team: team.clone(),
                    });
                }
            }
            let (list_record, task_records) = list_records(list);
            snapshot.insert(list_record)?;
            for record in task_records {
                snapshot.insert(record)?;
            }
        }

        Ok(snapshot)
    }

    fn next_free_id(&self, reserved: Option<u64>) -> u64 {
        (0..)
            .find(|candidate| {
                let id = candidate.to_string();
                Some(*candidate) != reserved
                    && !self
                        .lists
                        .contains_key(&Uid::new(EntityType::List, id.as_str()))
                    && !self.teams.contains_key(&Uid::new(EntityType::Team, id))
            })
            .unwrap_or_default()
    }

    fn insert_fresh_team(&mut self, reserved: Option<u64>) -> Uid {
        let uid = Uid::new(EntityType::Team, self.next_free_id(reserved).to_string());
        self.teams.insert(uid.clone(), Team::new(uid.clone()));
        uid
    }
}

fn expect_type(uid: &Uid, expected: EntityType) -> StoreResult<()> {
    if uid.is(expected) {
        Ok(())
    } else {
        Err(StoreError::WrongEntityType {
            uid: uid.clone(),
            expected,
        })
    }
}

fn checked_key(key: &str, value: &Uid, expected: EntityType) -> StoreResult<()> {
    let parsed = parse_uid(key).map_err(|source| StoreError::InvalidKey {
        key: key.to_string(),
        source,
    })?;
    if &parsed != value {
        return Err(StoreError::KeyMismatch {
            key: key.to_string(),
            value: value.clone(),
        });
    }
    expect_type(value, expected)
}

fn snapshot_type(uid: &Uid, expected: EntityType) -> Result<(), SnapshotError> {
    if uid.is(expected) {
        Ok(())
    } else {
        Err(SnapshotError::WrongEntityType {
            uid: uid.clone(),
            expected,
        })
    }
}
