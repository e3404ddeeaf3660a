pub mod html;
pub mod ordering;
