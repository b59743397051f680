pub mod access;
pub mod health;
pub mod members;
pub mod projects;
pub mod roles;
pub mod sign_ins;
