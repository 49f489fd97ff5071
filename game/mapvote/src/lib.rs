#![deny(warnings)]
#![deny(clippy::all)]

pub mod chat;
pub mod controller;
pub mod nominate;
pub mod schedule;
pub mod seeding;
pub mod session;
