//! Request payloads accepted by the resource service.
//!
//! Identifier fields hold raw `Type::"id"` text; the service parses them so
//! that a malformed field can be reported by name.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GetListsRequest {
    pub uid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateListRequest {
    pub uid: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GetListRequest {
    pub uid: String,
    pub list: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateTaskRequest {
    pub uid: String,
    pub list: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateTaskRequest {
    pub uid: String,
    pub list: String,
    pub task: i64,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeleteTaskRequest {
    pub uid: String,
    pub list: String,
    pub task: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeleteListRequest {
    pub uid: String,
    pub list: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShareRequest {
    pub uid: String,
    pub list: String,
    pub role: String,
    pub share_with: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UnshareRequest {
    pub uid: String,
    pub list: String,
    pub role: String,
    pub unshare_with: String,
}
