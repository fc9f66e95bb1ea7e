pub mod preference;
pub mod scheme;
