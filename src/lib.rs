pub mod dom;
pub mod engine;
pub mod find;
pub mod net;
pub mod render;
