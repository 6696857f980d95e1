//! Core use-case services.
//!
//! # Responsibility
//! - Expose one authorize-then-apply pipeline per list/task/sharing operation.
//! - Classify failures so request boundaries can map them to responses.

pub mod error;
pub mod requests;
pub mod todo_service;

pub use error::{ErrorKind, InputError, InternalError, ServiceError, ServiceResult};
pub use requests::{
    CreateListRequest, CreateTaskRequest, DeleteListRequest, DeleteTaskRequest, GetListRequest,
    GetListsRequest, ShareRequest, UnshareRequest, UpdateTaskRequest,
};
pub use todo_service::TodoService;
