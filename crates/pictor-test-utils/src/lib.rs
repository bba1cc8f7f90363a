#![forbid(unsafe_code)]

mod http_server;

pub use crate::http_server::{fixed_routes, HitCounter, TestHttpServer};
