//! Wire types shared between the server and its clients.

pub mod protocol;
