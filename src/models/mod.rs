pub mod field_meta;
pub mod issue;
