//! List, task and sharing use-case service.
//!
//! # Responsibility
//! - Run the parse → authorize → apply pipeline for every operation.
//! - Own the shared entity store and its readers-writer lock.
//!
//! # Invariants
//! - Input is fully validated before any lock is taken.
//! - Reads authorize and read under one shared guard.
//! - Mutations authorize and mutate under one exclusive guard, so no writer
//!   can change the permission graph between the decision and the change.
//! - A denied request never touches the store.

use crate::authz::gateway::AuthorizationGateway;
use crate::authz::pdp::PolicyDecisionPoint;
use crate::model::action::Action;
use crate::model::entity::{append_parent, remove_shared_parent};
use crate::model::list::{List, TaskState};
use crate::model::role::ShareRole;
use crate::model::uid::{parse_uid, Uid};
use crate::service::error::{InputError, InternalError, ServiceError, ServiceResult};
use crate::service::requests::{
    CreateListRequest, CreateTaskRequest, DeleteListRequest, DeleteTaskRequest, GetListRequest,
    GetListsRequest, ShareRequest, UnshareRequest, UpdateTaskRequest,
};
use crate::store::entity_store::EntityStore;
use log::info;
use parking_lot::RwLock;

#[derive(Debug, Clone, Copy)]
enum ShareEdit {
    Grant,
    Revoke,
}

impl ShareEdit {
    fn event(self) -> &'static str {
        match self {
            Self::Grant => "list_share",
            Self::Revoke => "list_unshare",
        }
    }
}

/// Authorization-gated access to the shared entity graph.
pub struct TodoService<P> {
    store: RwLock<EntityStore>,
    gateway: AuthorizationGateway<P>,
    application: Uid,
}

impl<P: PolicyDecisionPoint> TodoService<P> {
    pub fn new(store: EntityStore, pdp: P) -> Self {
        let application = store.application_uid().clone();
        Self {
            store: RwLock::new(store),
            gateway: AuthorizationGateway::new(pdp),
            application,
        }
    }

    pub fn application_uid(&self) -> &Uid {
        &self.application
    }

    /// Runs `f` against the store under a shared guard.
    pub fn inspect<R>(&self, f: impl FnOnce(&EntityStore) -> R) -> R {
        let store = self.store.read();
        f(&*store)
    }

    /// Lists readable by the principal, in list-id order.
    ///
    /// Requires `GetLists` on the application, then filters every list by a
    /// separate `GetList` decision.
    pub fn get_lists(&self, request: &GetListsRequest) -> ServiceResult<Vec<List>> {
        let principal = parse_field("uid", &request.uid)?;

        let store = self.store.read();
        self.require_allowed(&store, "lists_get", &principal, Action::GetLists, &self.application)?;

        let mut readable = Vec::new();
        for list in store.lists() {
            let decision = self
                .gateway
                .authorize(&store, &principal, Action::GetList, &list.uid)?;
            if decision.allowed {
                readable.push(list.clone());
            }
        }

        info!(
            "event=lists_get module=service status=ok principal={} total={} readable={}",
            principal,
            store.list_count(),
            readable.len()
        );
        Ok(readable)
    }

    /// Creates a list owned by the principal and returns its uid.
    pub fn create_list(&self, request: &CreateListRequest) -> ServiceResult<Uid> {
        let principal = parse_field("uid", &request.uid)?;

        let mut store = self.store.write();
        self.require_allowed(
            &store,
            "list_create",
            &principal,
            Action::CreateList,
            &self.application,
        )?;
        let list = store.create_list(request.name.as_str(), principal.clone());

        info!(
            "event=list_create module=service status=ok principal={} list={}",
            principal, list
        );
        Ok(list)
    }

    pub fn get_list(&self, request: &GetListRequest) -> ServiceResult<List> {
        let principal = parse_field("uid", &request.uid)?;
        let list_uid = parse_field("list", &request.list)?;

        let store = self.store.read();
        self.require_allowed(&store, "list_get", &principal, Action::GetList, &list_uid)?;
        store
            .list(&list_uid)
            .cloned()
            .ok_or_else(|| InternalError::MissingList(list_uid).into())
    }

    /// Appends an unchecked task and returns its id.
    pub fn create_task(&self, request: &CreateTaskRequest) -> ServiceResult<usize> {
        let principal = parse_field("uid", &request.uid)?;
        let list_uid = parse_field("list", &request.list)?;

        let mut store = self.store.write();
        self.require_allowed(&store, "task_create", &principal, Action::CreateTask, &list_uid)?;
        let list = authorized_list(&mut store, &list_uid)?;
        let task = list.insert_task(request.name.as_str());

        info!(
            "event=task_create module=service status=ok principal={} list={} task={}",
            principal, list_uid, task
        );
        Ok(task)
    }

    /// Sets a task's state. Authorization targets the list, not the task.
    pub fn update_task(&self, request: &UpdateTaskRequest) -> ServiceResult<()> {
        let principal = parse_field("uid", &request.uid)?;
        let list_uid = parse_field("list", &request.list)?;
        let state = TaskState::parse(&request.state)
            .ok_or_else(|| InputError::InvalidTaskState(request.state.clone()))?;

        let mut store = self.store.write();
        self.require_allowed(&store, "task_update", &principal, Action::UpdateTask, &list_uid)?;
        let list = authorized_list(&mut store, &list_uid)?;
        let position = task_position(list, request.task)?;
        list.set_task_state(position, state);

        info!(
            "event=task_update module=service status=ok principal={} list={} task={} state={}",
            principal, list_uid, position, state
        );
        Ok(())
    }

    /// Removes a task; later tasks shift down one position.
    pub fn delete_task(&self, request: &DeleteTaskRequest) -> ServiceResult<()> {
        let principal = parse_field("uid", &request.uid)?;
        let list_uid = parse_field("list", &request.list)?;

        let mut store = self.store.write();
        self.require_allowed(&store, "task_delete", &principal, Action::DeleteTask, &list_uid)?;
        let list = authorized_list(&mut store, &list_uid)?;
        let position = task_position(list, request.task)?;
        list.delete_task(position);

        info!(
            "event=task_delete module=service status=ok principal={} list={} task={} remaining={}",
            principal,
            list_uid,
            position,
            list.tasks.len()
        );
        Ok(())
    }

    pub fn delete_list(&self, request: &DeleteListRequest) -> ServiceResult<()> {
        let principal = parse_field("uid", &request.uid)?;
        let list_uid = parse_field("list", &request.list)?;

        let mut store = self.store.write();
        self.require_allowed(&store, "list_delete", &principal, Action::DeleteList, &list_uid)?;
        store
            .remove_list(&list_uid)
            .ok_or_else(|| InternalError::MissingList(list_uid.clone()))?;

        info!(
            "event=list_delete module=service status=ok principal={} list={}",
            principal, list_uid
        );
        Ok(())
    }

    /// Grants the role's team membership to a Team or User.
    pub fn share(&self, request: &ShareRequest) -> ServiceResult<()> {
        self.edit_share(
            ShareEdit::Grant,
            &request.uid,
            &request.list,
            &request.role,
            ("share_with", &request.share_with),
        )
    }

    /// Revokes the role's team membership from a Team or User.
    ///
    /// Unsharing an edge that is missing, or that sits first in the target's
    /// parents, succeeds without changing anything.
    pub fn unshare(&self, request: &UnshareRequest) -> ServiceResult<()> {
        self.edit_share(
            ShareEdit::Revoke,
            &request.uid,
            &request.list,
            &request.role,
            ("unshare_with", &request.unshare_with),
        )
    }

    fn edit_share(
        &self,
        edit: ShareEdit,
        principal: &str,
        list: &str,
        role: &str,
        (target_field, target): (&'static str, &str),
    ) -> ServiceResult<()> {
        let principal = parse_field("uid", principal)?;
        let list_uid = parse_field("list", list)?;
        let target = parse_field(target_field, target)?;
        let role =
            ShareRole::parse(role).ok_or_else(|| InputError::InvalidRole(role.to_string()))?;

        let mut store = self.store.write();
        self.require_allowed(&store, edit.event(), &principal, Action::EditShare, &list_uid)?;

        let list = store
            .list(&list_uid)
            .ok_or_else(|| InternalError::MissingList(list_uid.clone()))?;
        let role_team = match role {
            ShareRole::Reader => list.readers.clone(),
            ShareRole::Editor => list.editors.clone(),
        };

        let parents = store
            .parents_mut(&target)
            .ok_or_else(|| InputError::ShareTargetNotFound {
                field: target_field,
                uid: target.clone(),
            })?;
        let changed = match edit {
            ShareEdit::Grant => {
                append_parent(parents, role_team.clone());
                true
            }
            ShareEdit::Revoke => remove_shared_parent(parents, &role_team),
        };

        info!(
            "event={} module=service status=ok principal={} list={} role={} target={} team={} changed={}",
            edit.event(),
            principal,
            list_uid,
            role,
            target,
            role_team,
            changed
        );
        Ok(())
    }

    fn require_allowed(
        &self,
        store: &EntityStore,
        event: &'static str,
        principal: &Uid,
        action: Action,
        resource: &Uid,
    ) -> ServiceResult<()> {
        let decision = self
            .gateway
            .authorize(store, principal, action, resource)?;
        if decision.allowed {
            return Ok(());
        }
        info!(
            "event={} module=service status=denied principal={} action={} resource={}",
            event, principal, action, resource
        );
        Err(ServiceError::AuthorizationDenied)
    }
}

fn parse_field(field: &'static str, text: &str) -> Result<Uid, InputError> {
    parse_uid(text).map_err(|source| InputError::MalformedIdentifier { field, source })
}

fn authorized_list<'a>(store: &'a mut EntityStore, uid: &Uid) -> ServiceResult<&'a mut List> {
    store
        .list_mut(uid)
        .ok_or_else(|| InternalError::MissingList(uid.clone()).into())
}

fn task_position(list: &List, index: i64) -> ServiceResult<usize> {
    list.task_position(index)
        .ok_or_else(|| ServiceError::TaskIndexOutOfRange {
            list: list.uid.clone(),
            index,
        })
}
