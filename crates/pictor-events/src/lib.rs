#![forbid(unsafe_code)]

mod bus;
mod event;

pub use crate::{
    bus::{CacheEvents, EventBus, LoaderEvents},
    event::{CacheEvent, Event, LoaderEvent},
};
