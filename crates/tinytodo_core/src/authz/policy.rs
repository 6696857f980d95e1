//! Cedar-backed policy decision point.
//!
//! # Responsibility
//! - Load the TinyTodo policy set from Cedar source text or a policy file.
//! - Evaluate requests with the Cedar authorizer over the snapshot's entity
//!   JSON.
//!
//! # Invariants
//! - Default deny: a request is allowed only when a permit policy holds and
//!   no forbid policy does.
//! - A policy that fails to evaluate is skipped and logged; the remaining
//!   policies still decide.
//! - Diagnostics are the ids of the determining policies, sorted.

use crate::authz::pdp::{Decision, PdpError, PolicyDecisionPoint};
use crate::model::action::Action;
use crate::model::uid::Uid;
use crate::store::snapshot::EntitySnapshot;
use cedar_policy::{
    Authorizer, Context, Decision as CedarDecision, Entities, EntityId, EntityTypeName,
    EntityUid, ParseErrors, PolicySet, Request,
};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Policy file could not be turned into a policy set.
#[derive(Debug)]
pub enum PolicyError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(ParseErrors),
}

impl Display for PolicyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read policies `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "failed to parse policies: {err}"),
        }
    }
}

impl Error for PolicyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

/// Policy decision point evaluating a Cedar [`PolicySet`].
#[derive(Debug, Clone)]
pub struct CedarPdp {
    policies: PolicySet,
}

impl CedarPdp {
    /// Parses Cedar policy source; policies are named `policy0`, `policy1`, ...
    /// in source order.
    pub fn from_source(source: &str) -> Result<Self, PolicyError> {
        let policies = PolicySet::from_str(source).map_err(PolicyError::Parse)?;
        Ok(Self { policies })
    }

    /// Reads and parses the policy file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let pdp = std::fs::read_to_string(path)
            .map_err(|source| PolicyError::Io {
                path: path.to_path_buf(),
                source,
            })
            .and_then(|source| Self::from_source(&source));

        match &pdp {
            Ok(pdp) => info!(
                "event=policies_load module=authz status=ok path={} policies={}",
                path.display(),
                pdp.policy_count()
            ),
            Err(err) => error!(
                "event=policies_load module=authz status=error path={} error={}",
                path.display(),
                err
            ),
        }
        pdp
    }

    pub fn policy_count(&self) -> usize {
        self.policies.policies().count()
    }
}

impl PolicyDecisionPoint for CedarPdp {
    fn evaluate(
        &self,
        entities: &EntitySnapshot,
        principal: &Uid,
        action: Action,
        resource: &Uid,
    ) -> Result<Decision, PdpError> {
        let entities = Entities::from_json_value(entities.to_json(), None)
            .map_err(|err| PdpError::Entities(err.to_string()))?;
        let request = Request::new(
            cedar_uid(principal)?,
            cedar_uid(&action.uid())?,
            cedar_uid(resource)?,
            Context::empty(),
            None,
        )
        .map_err(|err| PdpError::Evaluation(err.to_string()))?;

        let response = Authorizer::new().is_authorized(&request, &self.policies, &entities);
        for err in response.diagnostics().errors() {
            warn!(
                "event=policy_error module=authz principal={} action={} resource={} error={}",
                principal, action, resource, err
            );
        }

        let mut diagnostics: Vec<String> = response
            .diagnostics()
            .reason()
            .map(ToString::to_string)
            .collect();
        diagnostics.sort();

        Ok(Decision {
            allowed: response.decision() == CedarDecision::Allow,
            diagnostics,
        })
    }
}

fn cedar_uid(uid: &Uid) -> Result<EntityUid, PdpError> {
    let type_name = EntityTypeName::from_str(uid.entity_type().as_str()).map_err(|err| {
        PdpError::Evaluation(format!("invalid entity type `{}`: {err}", uid.entity_type()))
    })?;
    Ok(EntityUid::from_type_name_and_id(
        type_name,
        EntityId::new(uid.id()),
    ))
}

#[cfg(test)]
mod tests {
    use super::{CedarPdp, PolicyError};
    use crate::authz::pdp::{PdpError, PolicyDecisionPoint};
    use crate::model::action::Action;
    use crate::model::uid::{EntityType, Uid};
    use crate::store::snapshot::{AttrValue, EntityRecord, EntitySnapshot};
    use std::io::Write;

    const POLICIES: &str = include_str!("../../fixtures/policies.cedar");

    fn pdp() -> CedarPdp {
        CedarPdp::from_source(POLICIES).expect("bundled policies parse")
    }

    fn uid(entity_type: EntityType, id: &str) -> Uid {
        Uid::new(entity_type, id)
    }

    fn app() -> Uid {
        uid(EntityType::Application, "TinyTodo")
    }

    fn list() -> Uid {
        uid(EntityType::List, "0")
    }

    fn list_record(owner: AttrValue) -> EntityRecord {
        EntityRecord::new(list())
            .with_attr("name", AttrValue::String("Cedar blog post".to_string()))
            .with_attr("owner", owner)
            .with_attr("readers", AttrValue::Entity(uid(EntityType::Team, "1")))
            .with_attr("editors", AttrValue::Entity(uid(EntityType::Team, "2")))
    }

    /// andrew owns List 0; readers Team 1, editors Team 2; aaron in interns.
    fn snapshot_with(list: EntityRecord) -> EntitySnapshot {
        let mut snapshot = EntitySnapshot::new();
        let records = [
            EntityRecord::new(app()),
            EntityRecord::new(uid(EntityType::User, "andrew")).with_parents([&app()]),
            EntityRecord::new(uid(EntityType::User, "aaron"))
                .with_parents([&app(), &uid(EntityType::Team, "interns")]),
            EntityRecord::new(uid(EntityType::Team, "interns")).with_parents([&app()]),
            EntityRecord::new(uid(EntityType::Team, "1")),
            EntityRecord::new(uid(EntityType::Team, "2")),
            list,
        ];
        for record in records {
            snapshot.insert(record).expect("unique record");
        }
        snapshot
    }

    fn snapshot() -> EntitySnapshot {
        snapshot_with(list_record(AttrValue::Entity(uid(
            EntityType::User,
            "andrew",
        ))))
    }

    fn share(snapshot: &EntitySnapshot, member: &Uid, team: &str) -> EntitySnapshot {
        let mut updated = EntitySnapshot::new();
        for record in snapshot.records() {
            let mut record = record.clone();
            if &record.uid == member {
                record.parents.insert(uid(EntityType::Team, team));
            }
            updated.insert(record).expect("unique record");
        }
        updated
    }

    #[test]
    fn bundled_policy_file_has_four_policies() {
        assert_eq!(pdp().policy_count(), 4);
    }

    #[test]
    fn anyone_may_create_and_enumerate_lists_on_the_application() {
        let pdp = pdp();
        let aaron = uid(EntityType::User, "aaron");
        for action in [Action::CreateList, Action::GetLists] {
            let decision = pdp
                .evaluate(&snapshot(), &aaron, action, &app())
                .expect("evaluate");
            assert!(decision.allowed);
            assert_eq!(decision.diagnostics, vec!["policy0".to_string()]);
        }
        let denied = pdp
            .evaluate(&snapshot(), &aaron, Action::DeleteList, &app())
            .expect("evaluate");
        assert!(!denied.allowed);
    }

    #[test]
    fn owner_may_do_anything_with_their_list() {
        let pdp = pdp();
        let andrew = uid(EntityType::User, "andrew");
        for action in Action::ALL {
            let decision = pdp
                .evaluate(&snapshot(), &andrew, action, &list())
                .expect("evaluate");
            assert!(decision.allowed, "owner denied {action}");
            assert!(decision.diagnostics.contains(&"policy1".to_string()));
        }
    }

    #[test]
    fn unrelated_user_is_denied_without_diagnostics() {
        let decision = pdp()
            .evaluate(
                &snapshot(),
                &uid(EntityType::User, "aaron"),
                Action::CreateTask,
                &list(),
            )
            .expect("evaluate");
        assert!(!decision.allowed);
        assert!(decision.diagnostics.is_empty());
    }

    #[test]
    fn readers_may_only_read_and_editors_may_edit() {
        let pdp = pdp();
        let aaron = uid(EntityType::User, "aaron");
        let interns = uid(EntityType::Team, "interns");

        let reader = share(&snapshot(), &interns, "1");
        let get = pdp
            .evaluate(&reader, &aaron, Action::GetList, &list())
            .expect("evaluate");
        assert!(get.allowed);
        assert_eq!(get.diagnostics, vec!["policy2".to_string()]);
        let update = pdp
            .evaluate(&reader, &aaron, Action::UpdateList, &list())
            .expect("evaluate");
        assert!(!update.allowed);

        let editor = share(&snapshot(), &interns, "2");
        for action in [
            Action::GetList,
            Action::UpdateList,
            Action::CreateTask,
            Action::UpdateTask,
            Action::DeleteTask,
        ] {
            let decision = pdp
                .evaluate(&editor, &aaron, action, &list())
                .expect("evaluate");
            assert!(decision.allowed, "editor denied {action}");
        }
        for action in [Action::DeleteList, Action::EditShare] {
            let decision = pdp
                .evaluate(&editor, &aaron, action, &list())
                .expect("evaluate");
            assert!(!decision.allowed, "editor allowed {action}");
        }
    }

    #[test]
    fn missing_resource_is_a_plain_deny() {
        let decision = pdp()
            .evaluate(
                &snapshot(),
                &uid(EntityType::User, "andrew"),
                Action::GetList,
                &uid(EntityType::List, "99"),
            )
            .expect("evaluate");
        assert!(!decision.allowed);
    }

    #[test]
    fn malformed_owner_does_not_block_other_grants() {
        let snapshot = snapshot_with(list_record(AttrValue::String("andrew".to_string())));
        let reader = share(&snapshot, &uid(EntityType::Team, "interns"), "1");
        let pdp = pdp();

        let owner = pdp
            .evaluate(
                &reader,
                &uid(EntityType::User, "andrew"),
                Action::GetList,
                &list(),
            )
            .expect("string owner is not an engine failure");
        assert!(!owner.allowed);

        let decision = pdp
            .evaluate(
                &reader,
                &uid(EntityType::User, "aaron"),
                Action::GetList,
                &list(),
            )
            .expect("reader grant still evaluates");
        assert!(decision.allowed);
        assert_eq!(decision.diagnostics, vec!["policy2".to_string()]);
    }

    #[test]
    fn malformed_readers_attribute_skips_only_that_policy() {
        let record = EntityRecord::new(list())
            .with_attr("owner", AttrValue::Entity(uid(EntityType::User, "andrew")))
            .with_attr("readers", AttrValue::String("Team 1".to_string()))
            .with_attr("editors", AttrValue::Entity(uid(EntityType::Team, "2")));
        let snapshot = snapshot_with(record);

        let decision = pdp()
            .evaluate(
                &snapshot,
                &uid(EntityType::User, "andrew"),
                Action::GetList,
                &list(),
            )
            .expect("evaluate");
        assert!(decision.allowed);
        assert_eq!(decision.diagnostics, vec!["policy1".to_string()]);
    }

    #[test]
    fn policies_load_from_a_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(POLICIES.as_bytes()).expect("write policies");
        let pdp = CedarPdp::load(file.path()).expect("load policies");
        assert_eq!(pdp.policy_count(), 4);
    }

    #[test]
    fn missing_policy_file_is_an_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("policies.cedar");
        let err = CedarPdp::load(&missing).expect_err("missing file");
        match err {
            PolicyError::Io { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_policy_source_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"permit (principal, action, resource) when {")
            .expect("write policies");
        assert!(matches!(
            CedarPdp::load(file.path()),
            Err(PolicyError::Parse(_))
        ));
    }

    #[test]
    fn cyclic_membership_is_rejected_or_denied() {
        let interns = uid(EntityType::Team, "interns");
        let mut cyclic = EntitySnapshot::new();
        for record in snapshot().records() {
            let mut record = record.clone();
            if record.uid == uid(EntityType::Team, "1") {
                record.parents.insert(interns.clone());
            }
            cyclic.insert(record).expect("unique record");
        }
        let cyclic = share(&cyclic, &interns, "1");

        match pdp().evaluate(
            &cyclic,
            &uid(EntityType::User, "kesha"),
            Action::GetList,
            &list(),
        ) {
            Ok(decision) => assert!(!decision.allowed),
            Err(err) => assert!(matches!(err, PdpError::Entities(_))),
        }
    }
}
