#![forbid(unsafe_code)]

//! Background delivery cache worker.
//!
//! Classifies every intercepted request into a resource class and applies
//! that class's caching discipline over named, versioned cache
//! partitions. The worker is an out-of-band component: page code never
//! calls it directly, it talks to the network/cache boundary and a small
//! message channel (`SKIP_WAITING`, `CACHE_IMAGES`).

mod classify;
mod error;
mod manifest;
mod partition;
mod policy;
mod worker;

pub use crate::{
    classify::{classify, RequestClass},
    error::{CacheError, CacheResult},
    manifest::WorkerManifest,
    partition::{CachedResponse, MemoryStore, PartitionStore},
    worker::{DeliveryWorker, FetchOutcome, WorkerHandle, WorkerMessage, WorkerState},
};
