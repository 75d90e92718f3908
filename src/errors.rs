//! Crate error types generated by `error_chain!`.
//!
//! Other modules `use errors::*;` to get `Error`, `ErrorKind`, `Result` and `ResultExt`.
#![allow(deprecated)]

use error_chain::*;

error_chain! {

    foreign_links {
        Io(::std::io::Error);
        Json(::serde_json::Error);
    }

    errors {
        InvalidGridShape(reason: String) {
            description("invalid grid shape")
            display("invalid grid shape: {}", reason)
        }
        InvalidCoordinate(coordinate: String, rows: usize, columns: usize) {
            description("coordinate outside the grid")
            display("coordinate {} is outside the {}X{} grid", coordinate, rows, columns)
        }
        MissingCoordinates(role: &'static str) {
            description("no coordinates supplied")
            display("at least one {} coordinate is required", role)
        }
        InvalidCellOrdinal(ordinal: i64) {
            description("invalid cell ordinal")
            display("{} is not a valid cell kind ordinal", ordinal)
        }
        CorruptSnapshot(reason: String) {
            description("corrupt binary snapshot")
            display("corrupt binary snapshot: {}", reason)
        }
    }
}
