//! kinelab-cli library: manifest parsing, OBJ reading and the command
//! implementations behind the `kinelab` binary.

pub mod commands;
pub mod manifest;
pub mod obj;
