pub mod message_routes;
pub mod page_routes;
pub mod recipe_routes;
