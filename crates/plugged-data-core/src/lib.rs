pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod response;
pub mod slot_file;
pub mod value;

pub use client::Connection;
pub use config::ClientConfig;
pub use error::{ClientError, ErrorInfo, ErrorKind};
pub use response::{
    DeleteResponse, EmptyResponse, Outcome, ReadResponse, Response, SingleResponse,
    WriteResponse,
};
pub use slot_file::JsonSlotFile;
pub use value::Row;

#[doc(hidden)]
pub mod __private {
    pub use serde_json::json;
}
