//! CloSpots core library: LINE webhook server, places lookup, and reply composition
//! used by the `clospots` binary.

pub mod channels;
pub mod config;
pub mod dispatch;
pub mod places;
pub mod reply;
pub mod server;
