pub mod approval;
pub mod dashboard;
pub mod departments;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod users;
pub mod webhooks;
