pub mod auth;
pub mod contacts;
pub mod health;
pub mod items;
pub mod messages;
pub mod swipes;
pub mod users;
