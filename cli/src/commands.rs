pub mod fields;
pub mod sum;
