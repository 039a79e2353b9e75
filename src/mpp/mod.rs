pub mod checksum;
pub mod command;
pub mod decoder;
pub mod device;
pub mod frame;
pub mod records;
pub mod transport;

pub use checksum::Checksum;
pub use command::{Command, CommandType};
pub use decoder::{DecodeError, FieldReader, Response};
