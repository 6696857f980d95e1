use tinytodo_core::service::{
    CreateListRequest, CreateTaskRequest, DeleteListRequest, DeleteTaskRequest, GetListRequest,
    GetListsRequest, UpdateTaskRequest,
};
use tinytodo_core::{
    CedarPdp, EntityStore, EntityType, List, ServiceError, TaskState, TodoService, Uid,
};

const FIXTURE: &str = include_str!("../fixtures/entities.json");
const POLICIES: &str = include_str!("../fixtures/policies.cedar");
const ANDREW: &str = "User::\"andrew\"";
const AARON: &str = "User::\"aaron\"";
const LIST0: &str = "List::\"0\"";

fn service() -> TodoService<CedarPdp> {
    TodoService::new(
        EntityStore::from_json(FIXTURE).expect("fixture"),
        CedarPdp::from_source(POLICIES).expect("policies"),
    )
}

fn create_list(service: &TodoService<CedarPdp>, owner: &str, name: &str) -> Uid {
    service
        .create_list(&CreateListRequest {
            uid: owner.to_string(),
            name: name.to_string(),
        })
        .expect("create list")
}

fn create_task(
    service: &TodoService<CedarPdp>,
    principal: &str,
    name: &str,
) -> Result<usize, ServiceError> {
    service.create_task(&CreateTaskRequest {
        uid: principal.to_string(),
        list: LIST0.to_string(),
        name: name.to_string(),
    })
}

fn get_list(
    service: &TodoService<CedarPdp>,
    principal: &str,
) -> Result<List, ServiceError> {
    service.get_list(&GetListRequest {
        uid: principal.to_string(),
        list: LIST0.to_string(),
    })
}

#[test]
fn first_list_gets_list_zero_with_teams_one_and_two() {
    let service = service();
    let list = create_list(&service, ANDREW, "Cedar blog post");
    assert_eq!(list, Uid::new(EntityType::List, "0"));

    let list = get_list(&service, ANDREW).expect("owner reads list");
    assert_eq!(list.name, "Cedar blog post");
    assert_eq!(list.owner, Uid::new(EntityType::User, "andrew"));
    assert_eq!(list.readers, Uid::new(EntityType::Team, "1"));
    assert_eq!(list.editors, Uid::new(EntityType::Team, "2"));
    assert!(list.tasks.is_empty());
}

#[test]
fn owner_may_add_tasks_and_unrelated_user_may_not() {
    let service = service();
    create_list(&service, ANDREW, "Cedar blog post");

    assert_eq!(create_task(&service, ANDREW, "Do something"), Ok(0));
    assert_eq!(
        create_task(&service, AARON, "Do something else"),
        Err(ServiceError::AuthorizationDenied)
    );
    assert_eq!(
        get_list(&service, AARON),
        Err(ServiceError::AuthorizationDenied)
    );
}

#[test]
fn task_lifecycle_tracks_state_and_positions() {
    let service = service();
    create_list(&service, ANDREW, "Cedar blog post");

    assert_eq!(create_task(&service, ANDREW, "Do something"), Ok(0));
    service
        .update_task(&UpdateTaskRequest {
            uid: ANDREW.to_string(),
            list: LIST0.to_string(),
            task: 0,
            state: "Checked".to_string(),
        })
        .expect("update task");
    let list = get_list(&service, ANDREW).expect("get list");
    assert_eq!(list.tasks[0].state, TaskState::Checked);

    assert_eq!(create_task(&service, ANDREW, "Do something else"), Ok(1));
    service
        .delete_task(&DeleteTaskRequest {
            uid: ANDREW.to_string(),
            list: LIST0.to_string(),
            task: 0,
        })
        .expect("delete task");
    let list = get_list(&service, ANDREW).expect("get list");
    assert_eq!(list.tasks.len(), 1);
    assert_eq!(list.tasks[0].id, 0);
    assert_eq!(list.tasks[0].uid, Uid::new(EntityType::Task, "0"));
    assert_eq!(list.tasks[0].name, "Do something else");
    assert_eq!(list.tasks[0].state, TaskState::Unchecked);
}

#[test]
fn get_lists_is_filtered_per_list() {
    let service = service();
    create_list(&service, ANDREW, "andrew's");
    create_list(&service, AARON, "aaron's");
    create_list(&service, ANDREW, "andrew's second");

    let names = |principal: &str| -> Vec<String> {
        service
            .get_lists(&GetListsRequest {
                uid: principal.to_string(),
            })
            .expect("get lists")
            .into_iter()
            .map(|list| list.name)
            .collect()
    };
    assert_eq!(names(ANDREW), vec!["andrew's", "andrew's second"]);
    assert_eq!(names(AARON), vec!["aaron's"]);
    assert!(names("User::\"kesha\"").is_empty());
}

#[test]
fn only_the_owner_may_delete_a_list() {
    let service = service();
    create_list(&service, ANDREW, "Cedar blog post");
    let delete = |principal: &str| {
        service.delete_list(&DeleteListRequest {
            uid: principal.to_string(),
            list: LIST0.to_string(),
        })
    };

    assert_eq!(delete(AARON), Err(ServiceError::AuthorizationDenied));
    delete(ANDREW).expect("owner deletes");
    assert_eq!(
        get_list(&service, ANDREW),
        Err(ServiceError::AuthorizationDenied)
    );
    assert_eq!(delete(ANDREW), Err(ServiceError::AuthorizationDenied));
}

#[test]
fn deleted_list_id_is_reused() {
    let service = service();
    create_list(&service, ANDREW, "first");
    service
        .delete_list(&DeleteListRequest {
            uid: ANDREW.to_string(),
            list: LIST0.to_string(),
        })
        .expect("delete");

    let reused = create_list(&service, AARON, "second");
    assert_eq!(reused, Uid::new(EntityType::List, "0"));
    let list = get_list(&service, AARON).expect("aaron owns the reused id");
    assert_eq!(list.name, "second");
    assert_ne!(list.readers, Uid::new(EntityType::Team, "1"));
}
