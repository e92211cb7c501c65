//! Account service models

pub mod account;

pub use account::{
    Account, AccountResponse, ChangePasswordRequest, LoginRequest, RegisterRequest,
    UpdateEmailRequest, UpdateProfileRequest,
};
