// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The compiled program and its on-disk layout.
//!
//! ```text
//! "MJ"  code size (4)  data size (4)  main pc (4)  code bytes
//! ```
//!
//! All numbers are big-endian.

use std::io::Write;

use crate::error::Result;

/// File signature.
pub const MAGIC: &[u8; 2] = b"MJ";

/// A finished program image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectCode {
    /// Bytecode
    pub code: Vec<u8>,
    /// Number of global data words
    pub data_size: usize,
    /// Entry point, if the program declares one
    pub main_pc: Option<usize>,
}

impl ObjectCode {
    /// Writes the image.
    pub fn write_to(&self, mut out: impl Write) -> Result<()> {
        out.write_all(&self.to_bytes())?;
        out.flush()?;
        Ok(())
    }

    /// The image as a byte vector. A missing entry point is written as 0.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(14 + self.code.len());
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&(self.code.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&(self.data_size as u32).to_be_bytes());
        bytes.extend_from_slice(&(self.main_pc.unwrap_or(0) as u32).to_be_bytes());
        bytes.extend_from_slice(&self.code);
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let object = ObjectCode {
            code: vec![58, 50],
            data_size: 3,
            main_pc: Some(1),
        };
        let bytes = object.to_bytes();
        assert_eq!(
            bytes,
            vec![b'M', b'J', 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0, 1, 58, 50]
        );
    }

    #[test]
    fn test_write_matches_to_bytes() {
        let object = ObjectCode {
            code: vec![16, 54],
            data_size: 0,
            main_pc: None,
        };
        let mut written = Vec::new();
        object.write_to(&mut written).unwrap();
        assert_eq!(written, object.to_bytes());
        assert_eq!(&written[10..14], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_missing_entry_point_header() {
        let object = ObjectCode {
            code: Vec::new(),
            data_size: 7,
            main_pc: None,
        };
        assert_eq!(
            object.to_bytes(),
            vec![b'M', b'J', 0, 0, 0, 0, 0, 0, 0, 7, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prog.obj");
        let object = ObjectCode {
            code: vec![58],
            data_size: 1,
            main_pc: Some(0),
        };
        object
            .write_to(std::fs::File::create(&path).unwrap())
            .unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), object.to_bytes());
    }
}
