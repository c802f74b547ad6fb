pub mod api_client;
pub mod cart_service;
pub mod editor_service;
pub mod local_store;
pub mod media_list;
