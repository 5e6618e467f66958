//! Data model shared by the SpaceNote client crates.
//!
//! Everything here mirrors the JSON the SpaceNote backend sends and accepts.
//! The client never owns these records; it holds read snapshots and pending
//! submissions.

pub mod auth;
pub mod comment;
pub mod field;
pub mod filter;
pub mod note;
pub mod space;
pub mod transfer;
pub mod user;

pub use auth::{ChangePasswordRequest, LoginRequest, LoginResponse, LogoutResponse, MeResponse};
pub use comment::{Comment, CreateCommentRequest};
pub use field::{FieldOptions, FieldType, SpaceField};
pub use filter::{Filter, FilterCondition, FilterOperator};
pub use note::{NoteFieldsRequest, Note, NotesPage};
pub use space::{
    CreateSpaceRequest, FieldNamesRequest, Space, TelegramConfig, TelegramTemplates,
    TemplateRequest,
};
pub use transfer::{ExportData, ImportResult};
pub use user::{CreateUserRequest, User};
