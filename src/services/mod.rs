// Application workflows and queries

pub mod approval_service;
pub mod gym_key_service;
pub mod gym_linking_service;
pub mod membership_service;
pub mod profile_service;
pub mod request_service;

pub use approval_service::ApprovalService;
pub use gym_key_service::GymKeyService;
pub use gym_linking_service::GymLinkingService;
pub use membership_service::MembershipService;
pub use profile_service::ProfileService;
pub use request_service::RequestService;
