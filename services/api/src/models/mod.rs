//! API service models

pub mod account;
pub mod analytics;
pub mod profile;

// Re-export for convenience
pub use account::{Account, AccountResponse, LoginCredentials, NewAccount};
pub use analytics::{EventKind, EventMetadata};
pub use profile::{
    ContactField, FieldKind, NewContactField, NewSocialLink, Profile, ProfilePatch,
    ProfileWithCollections, SocialLink,
};
