#![allow(clippy::missing_errors_doc)]

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use rescue_replay_core::Frame;
use serde::{Deserialize, Serialize};

const TRANSFER_DOMAIN: &str = "rescue";
const TRANSFER_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded frame payload.
pub(crate) const TRANSFER_HEADER: &str = "rescue:v1";
/// Delimiter separating the prefix, board dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Recorded frame sequence in a single-line, clipboard-friendly form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct ReplayTransfer {
    /// Number of board columns the sequence was recorded against.
    pub columns: u32,
    /// Number of board rows the sequence was recorded against.
    pub rows: u32,
    /// The frames themselves.
    pub frames: Vec<Frame>,
}

impl ReplayTransfer {
    /// Encodes the sequence into a single-line string.
    #[must_use]
    pub(crate) fn encode(&self) -> String {
        let payload = SerializableFrames {
            frames: self.frames.clone(),
        };
        let json = serde_json::to_vec(&payload).expect("frame serialization never fails");
        let encoded = STANDARD_NO_PAD.encode(json);
        format!("{TRANSFER_HEADER}:{}x{}:{encoded}", self.columns, self.rows)
    }

    /// Decodes a sequence from its string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, TransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(TransferError::EmptyPayload);
        }

        let mut parts = trimmed.splitn(4, FIELD_DELIMITER);
        let domain = parts.next().ok_or(TransferError::Truncated)?;
        let version = parts.next().ok_or(TransferError::Truncated)?;
        let dimensions = parts.next().ok_or(TransferError::Truncated)?;
        let payload = parts.next().ok_or(TransferError::Truncated)?;

        if domain != TRANSFER_DOMAIN {
            return Err(TransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != TRANSFER_VERSION {
            return Err(TransferError::UnsupportedVersion(version.to_owned()));
        }

        let (columns, rows) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(TransferError::InvalidEncoding)?;
        let decoded: SerializableFrames =
            serde_json::from_slice(&bytes).map_err(TransferError::InvalidPayload)?;

        Ok(Self {
            columns,
            rows,
            frames: decoded.frames,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableFrames {
    frames: Vec<Frame>,
}

/// Errors that can occur while decoding transfer strings.
#[derive(Debug)]
pub(crate) enum TransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// One of the prefix, version, dimension or payload sections is missing.
    Truncated,
    /// The string carries an unexpected prefix segment.
    InvalidPrefix(String),
    /// The string uses an unsupported version identifier.
    UnsupportedVersion(String),
    /// The board dimensions could not be parsed.
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload could not be deserialised.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "transfer string was empty"),
            Self::Truncated => write!(f, "transfer string is missing a section"),
            Self::InvalidPrefix(prefix) => {
                write!(f, "transfer prefix '{prefix}' is not supported")
            }
            Self::UnsupportedVersion(version) => {
                write!(f, "transfer version '{version}' is not supported")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "could not parse board dimensions '{dimensions}'")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode transfer payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse transfer payload: {error}")
            }
        }
    }
}

impl Error for TransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), TransferError> {
    let (columns, rows) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| TransferError::InvalidDimensions(dimensions.to_owned()))?;

    let columns = columns
        .trim()
        .parse::<u32>()
        .map_err(|_| TransferError::InvalidDimensions(dimensions.to_owned()))?;
    let rows = rows
        .trim()
        .parse::<u32>()
        .map_err(|_| TransferError::InvalidDimensions(dimensions.to_owned()))?;

    if columns == 0 || rows == 0 {
        return Err(TransferError::InvalidDimensions(dimensions.to_owned()));
    }

    Ok((columns, rows))
}
