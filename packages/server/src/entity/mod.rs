pub mod author;
pub mod category;
pub mod post;
pub mod post_author;
pub mod post_category;
pub mod post_image;
