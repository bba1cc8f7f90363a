#![forbid(unsafe_code)]

mod client;
mod error;
mod static_net;
mod traits;
mod types;

pub use crate::{
    client::HttpClient,
    error::{NetError, NetResult},
    static_net::StaticNet,
    traits::{Net, NetExt},
    types::{FetchedResponse, Headers, NetOptions},
};
