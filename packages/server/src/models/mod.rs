pub mod admin;
pub mod post;
pub mod shared;
pub mod sync;
