//! Image rendition keys.
//!
//! A rendition key names one derived size of an uploaded image, in the
//! form `<operation>__<width>x<height>`, e.g. `thumbnail__445x445`.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How the source image is fitted into the target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenditionOp {
    /// Scale down preserving aspect ratio so it fits inside the box.
    Thumbnail,
    /// Scale and crop to exactly fill the box.
    Crop,
}

impl RenditionOp {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Thumbnail => "thumbnail",
            Self::Crop => "crop",
        }
    }
}

/// Errors from parsing a [`RenditionKey`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenditionKeyError {
    #[error("rendition key must look like <op>__<width>x<height>: {0}")]
    Malformed(String),
    #[error("unknown rendition operation: {0}")]
    UnknownOp(String),
    #[error("rendition dimensions must be positive integers: {0}")]
    InvalidSize(String),
}

/// A parsed rendition key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenditionKey {
    pub op: RenditionOp,
    pub width: u32,
    pub height: u32,
}

impl FromStr for RenditionKey {
    type Err = RenditionKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (op, size) = s
            .split_once("__")
            .ok_or_else(|| RenditionKeyError::Malformed(s.to_owned()))?;

        let op = match op {
            "thumbnail" => RenditionOp::Thumbnail,
            "crop" => RenditionOp::Crop,
            other => return Err(RenditionKeyError::UnknownOp(other.to_owned())),
        };

        let (width, height) = size
            .split_once('x')
            .ok_or_else(|| RenditionKeyError::Malformed(s.to_owned()))?;
        let parse = |v: &str| -> Result<u32, RenditionKeyError> {
            v.parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| RenditionKeyError::InvalidSize(size.to_owned()))
        };

        Ok(Self {
            op,
            width: parse(width)?,
            height: parse(height)?,
        })
    }
}

impl fmt::Display for RenditionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}__{}x{}", self.op.as_str(), self.width, self.height)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_thumbnail_key() {
        let key: RenditionKey = "thumbnail__445x445".parse().unwrap();
        assert_eq!(key.op, RenditionOp::Thumbnail);
        assert_eq!((key.width, key.height), (445, 445));
        assert_eq!(key.to_string(), "thumbnail__445x445");
    }

    #[test]
    fn test_parse_crop_key() {
        let key: RenditionKey = "crop__60x40".parse().unwrap();
        assert_eq!(key.op, RenditionOp::Crop);
        assert_eq!((key.width, key.height), (60, 40));
    }

    #[test]
    fn test_parse_rejects_bad_keys() {
        assert!(matches!(
            "thumbnail-445x445".parse::<RenditionKey>(),
            Err(RenditionKeyError::Malformed(_))
        ));
        assert!(matches!(
            "resize__10x10".parse::<RenditionKey>(),
            Err(RenditionKeyError::UnknownOp(_))
        ));
        assert!(matches!(
            "thumbnail__0x10".parse::<RenditionKey>(),
            Err(RenditionKeyError::InvalidSize(_))
        ));
        assert!(matches!(
            "thumbnail__axb".parse::<RenditionKey>(),
            Err(RenditionKeyError::InvalidSize(_))
        ));
    }
}
