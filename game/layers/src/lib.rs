#![deny(warnings)]
#![deny(clippy::all)]

pub mod catalog;
pub mod faction;
pub mod layer;
