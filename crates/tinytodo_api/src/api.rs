//! HTTP-contract API over the TinyTodo resource service.
//!
//! # Responsibility
//! - Map each route to one resource-service call.
//! - Decode query strings and JSON bodies; encode the wire responses.
//!
//! # Invariants
//! - Handlers never panic; every outcome is an `ApiResponse`.
//! - Denials and domain errors are 200 with an `error` payload.
//! - Internal failures are 500 with a fixed message; details go to the log only.

use log::{error, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use tinytodo_core::service::{
    CreateListRequest, CreateTaskRequest, DeleteListRequest, DeleteTaskRequest, ErrorKind,
    GetListRequest, GetListsRequest, InputError, ServiceError, ShareRequest, UnshareRequest,
    UpdateTaskRequest,
};
use tinytodo_core::{PolicyDecisionPoint, TodoService};

const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// Status code plus JSON (or empty) body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    fn message(message: &str) -> Self {
        Self::generic(200, None, Some(message))
    }

    fn error(status: u16, message: &str) -> Self {
        Self::generic(status, Some(message), None)
    }

    fn generic(status: u16, error: Option<&str>, message: Option<&str>) -> Self {
        let envelope = GenericResponse { error, message };
        match serde_json::to_string(&envelope) {
            Ok(body) => Self { status, body },
            Err(_) => Self {
                status: 500,
                body: String::new(),
            },
        }
    }
}

/// `{"error"?: string, "message"?: string}` with empty fields omitted.
#[derive(Serialize)]
struct GenericResponse<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Home,
    ListsGet,
    ListCreate,
    ListGet,
    ListDelete,
    TaskCreate,
    TaskUpdate,
    TaskDelete,
    Share,
}

impl Endpoint {
    fn from_path(path: &str) -> Option<Self> {
        match path {
            "/" => Some(Self::Home),
            "/api/lists/get" => Some(Self::ListsGet),
            "/api/list/create" => Some(Self::ListCreate),
            "/api/list/get" => Some(Self::ListGet),
            "/api/list/delete" => Some(Self::ListDelete),
            "/api/task/create" => Some(Self::TaskCreate),
            "/api/task/update" => Some(Self::TaskUpdate),
            "/api/task/delete" => Some(Self::TaskDelete),
            "/api/share" => Some(Self::Share),
            _ => None,
        }
    }

    fn allows(self, method: &str) -> bool {
        match self {
            Self::Home | Self::ListsGet | Self::ListGet => method == "GET",
            Self::ListCreate | Self::TaskCreate | Self::TaskUpdate => method == "POST",
            Self::ListDelete | Self::TaskDelete => method == "DELETE",
            Self::Share => method == "POST" || method == "DELETE",
        }
    }
}

/// Route table and handlers bound to one service instance.
pub struct TodoApi<P> {
    service: TodoService<P>,
}

impl<P: PolicyDecisionPoint> TodoApi<P> {
    pub fn new(service: TodoService<P>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &TodoService<P> {
        &self.service
    }

    /// Dispatches one request. `query` excludes the leading `?`.
    pub fn handle(&self, method: &str, path: &str, query: &str, body: &str) -> ApiResponse {
        let method = method.to_ascii_uppercase();
        let response = self.route(&method, path, query, body);
        info!(
            "event=http_request module=api status={} method={} path={}",
            response.status, method, path
        );
        response
    }

    fn route(&self, method: &str, path: &str, query: &str, body: &str) -> ApiResponse {
        let Some(endpoint) = Endpoint::from_path(path) else {
            return ApiResponse::error(404, "Not Found");
        };
        if !endpoint.allows(method) {
            return ApiResponse::error(405, "Method Not Allowed");
        }

        match endpoint {
            Endpoint::Home => ApiResponse::ok(""),
            Endpoint::ListsGet => self.get_lists(query),
            Endpoint::ListCreate => self.create_list(body),
            Endpoint::ListGet => self.get_list(query),
            Endpoint::ListDelete => self.delete_list(body),
            Endpoint::TaskCreate => self.create_task(body),
            Endpoint::TaskUpdate => self.update_task(body),
            Endpoint::TaskDelete => self.delete_task(body),
            Endpoint::Share if method == "DELETE" => self.unshare(body),
            Endpoint::Share => self.share(body),
        }
    }

    /// `GET /api/lists/get?uid=<principal>`: JSON array of readable lists.
    pub fn get_lists(&self, query: &str) -> ApiResponse {
        let params = query_params(query);
        let request = GetListsRequest {
            uid: param(&params, "uid"),
        };
        respond(self.service.get_lists(&request), |lists| {
            serde_json::to_string(&lists).map(ApiResponse::ok)
        })
    }

    /// `POST /api/list/create`: the new list uid as a JSON string.
    pub fn create_list(&self, body: &str) -> ApiResponse {
        let result = decode::<CreateListRequest>(body)
            .and_then(|request| self.service.create_list(&request));
        respond(result, |uid| serde_json::to_string(&uid).map(ApiResponse::ok))
    }

    /// `GET /api/list/get?uid=<principal>&list=<list>`: the list as JSON.
    pub fn get_list(&self, query: &str) -> ApiResponse {
        let params = query_params(query);
        let request = GetListRequest {
            uid: param(&params, "uid"),
            list: param(&params, "list"),
        };
        respond(self.service.get_list(&request), |list| {
            serde_json::to_string(&list).map(ApiResponse::ok)
        })
    }

    /// `POST /api/task/create`: the new task id as a bare integer.
    pub fn create_task(&self, body: &str) -> ApiResponse {
        let result = decode::<CreateTaskRequest>(body)
            .and_then(|request| self.service.create_task(&request));
        respond(result, |task| Ok(ApiResponse::ok(task.to_string())))
    }

    pub fn update_task(&self, body: &str) -> ApiResponse {
        let result = decode::<UpdateTaskRequest>(body)
            .and_then(|request| self.service.update_task(&request));
        respond(result, acknowledged)
    }

    pub fn delete_task(&self, body: &str) -> ApiResponse {
        let result = decode::<DeleteTaskRequest>(body)
            .and_then(|request| self.service.delete_task(&request));
        respond(result, acknowledged)
    }

    pub fn delete_list(&self, body: &str) -> ApiResponse {
        let result = decode::<DeleteListRequest>(body)
            .and_then(|request| self.service.delete_list(&request));
        respond(result, acknowledged)
    }

    pub fn share(&self, body: &str) -> ApiResponse {
        let result =
            decode::<ShareRequest>(body).and_then(|request| self.service.share(&request));
        respond(result, acknowledged)
    }

    pub fn unshare(&self, body: &str) -> ApiResponse {
        let result =
            decode::<UnshareRequest>(body).and_then(|request| self.service.unshare(&request));
        respond(result, acknowledged)
    }
}

fn query_params(query: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

/// Missing parameters become empty strings and fail identifier parsing.
fn param(params: &HashMap<String, String>, name: &str) -> String {
    params.get(name).cloned().unwrap_or_default()
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ServiceError> {
    serde_json::from_str(body)
        .map_err(|err| ServiceError::Input(InputError::MalformedBody(err.to_string())))
}

fn acknowledged(_: ()) -> serde_json::Result<ApiResponse> {
    Ok(ApiResponse::message("ok"))
}

fn respond<T>(
    result: Result<T, ServiceError>,
    encode: impl FnOnce(T) -> serde_json::Result<ApiResponse>,
) -> ApiResponse {
    let err = match result {
        Ok(value) => match encode(value) {
            Ok(response) => return response,
            Err(err) => {
                error!("event=encode_response module=api status=error error={err}");
                return ApiResponse::error(500, INTERNAL_ERROR_MESSAGE);
            }
        },
        Err(err) => err,
    };

    match err.kind() {
        ErrorKind::Input => ApiResponse::error(400, &err.to_string()),
        ErrorKind::Denied | ErrorKind::Domain => ApiResponse::error(200, &err.to_string()),
        ErrorKind::Internal => {
            error!("event=service_failure module=api status=error error={err}");
            ApiResponse::error(500, INTERNAL_ERROR_MESSAGE)
        }
    }
}
