//! Response file handler.
//!
//! Used by `rules`, `shopping` and `tarkov_pve`: the reply is the content of
//! the file named after the trigger.

use log::debug;

use crate::responses::ResponseReader;

/// Returns the content of `file_name`, or the error text produced by the
/// reader.
pub async fn handle_response_file(reader: &ResponseReader, file_name: &str) -> String {
    debug!("handling response file command for {}", file_name);

    reader.read(file_name).await
}
