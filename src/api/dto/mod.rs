//! Request/response DTO types for the REST API.

pub mod area_dto;
pub mod event_dto;
pub mod user_dto;

pub use area_dto::{AreaDto, AreaSignalRequest, CreateAreaRequest};
pub use event_dto::{EventDto, ParkingSignalRequest, RecentParams, SignalResponse};
pub use user_dto::{SignupRequest, UserDto};
