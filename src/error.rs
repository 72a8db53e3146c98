// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `RadioRA` library.
//!
//! Transport and parse failures inside the connection task are logged and
//! absorbed there. Callers only ever see the errors below: invalid values
//! rejected before any I/O, a missed deadline, or a client whose connection
//! task has gone away.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred during protocol communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing configuration or controller output.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error occurred during device operations.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// The connection task has shut down.
    #[error("client has been shut down")]
    Closed,
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
        /// The actual value that was provided.
        actual: f64,
    },

    /// A level could not be interpreted as a number.
    #[error("invalid level: {0}")]
    InvalidLevel(String),

    /// An output id could not be interpreted as an integer.
    #[error("invalid output id: {0}")]
    InvalidOutputId(String),

    /// An accessory was asked for a characteristic it cannot report.
    #[error("unsupported read kind: {0}")]
    UnsupportedReadKind(String),

    /// An unknown device type was found in the configuration.
    #[error("invalid device type: {0}")]
    InvalidDeviceType(String),
}

/// Errors related to communication with the controller.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Connection to the controller failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Socket I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to parsing controller output or configuration.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unexpected line format.
    #[error("unexpected format: {0}")]
    UnexpectedFormat(String),

    /// Failed to parse a specific value.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },
}

/// Errors related to configured devices.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// No device with this output id is configured.
    #[error("no device configured for output {0}")]
    UnknownDevice(u32),

    /// Client configuration is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
