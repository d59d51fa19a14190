pub mod fuzzy;
pub mod numeric;
