pub mod depsgraph;
pub mod not_found;
