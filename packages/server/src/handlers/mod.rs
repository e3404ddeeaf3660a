pub mod admin;
pub mod post;
pub mod sync;
