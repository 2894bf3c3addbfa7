//! Data models for the campus admin server

pub mod communication;
pub mod enums;
pub mod university;
pub mod user;
pub mod walkin;

// Re-export commonly used types
pub use communication::{
    AdminCommunication, AdminCommunicationCreate, AdminCommunicationHistoryResponse,
};
pub use enums::{CommunicationStatus, CommunicationType, WalkInStatus};
pub use university::University;
pub use user::{Role, UserClaims};
pub use walkin::{WalkIn, WalkInCreate, WalkInOwner, WalkInTransition};
