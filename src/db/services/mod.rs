pub mod message_service;
pub mod recipe_service;
