pub mod design;
pub mod digest;
pub mod enzymes;
pub mod index;
