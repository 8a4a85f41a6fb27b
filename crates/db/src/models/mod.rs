//! Row structs and DTOs.
//!
//! Each submodule contains a `FromRow` entity matching the table and the
//! DTOs used to insert into it.

pub mod content_item;
pub mod promotion;
