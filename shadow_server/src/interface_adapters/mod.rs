// Interface adapters: wire protocol, sockets, storage and outbound clients.

pub mod clients;
pub mod http;
pub mod hub;
pub mod net;
pub mod protocol;
pub mod repository;
pub mod state;
pub mod utils;
