pub mod control;
pub mod data;
pub mod network;
pub mod pasv;
pub mod port;
