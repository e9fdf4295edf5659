// Chess opponent that mixes oracle moves, random moves and disguised illegal moves
pub mod board;
pub mod config;
pub mod error;
pub mod oracle;
pub mod policy;
pub mod protocol;
pub mod session;
