//! Input source handling.
//!
//! Opens a DIMACS input from a file path or standard input, transparently
//! decoding gzip-compressed files by extension.

use flate2::read::GzDecoder;
use keel_base::Result;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Opens the given path, or standard input when `path` is `None`.
///
/// Files ending in `.gz` are decoded on the fly.
pub fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>> {
    match path {
        None => Ok(Box::new(io::stdin())),
        Some(path) => {
            let file = File::open(path)?;
            if path.extension().is_some_and(|e| e == "gz") {
                Ok(Box::new(GzDecoder::new(file)))
            } else {
                Ok(Box::new(file))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DimacsCnf;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_open_plain_file() {
        let dir = std::env::temp_dir();
        let path = dir.join("keel_reader_plain.cnf");
        std::fs::write(&path, "p cnf 1 1\n1 0\n").unwrap();
        let reader = open_input(Some(&path)).unwrap();
        let cnf = DimacsCnf::from_reader(reader).unwrap();
        assert_eq!(cnf.num_vars, 1);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_open_gzip_file() {
        let dir = std::env::temp_dir();
        let path = dir.join("keel_reader_gzip.cnf.gz");
        let file = File::create(&path).unwrap();
        let mut enc = GzEncoder::new(file, Compression::default());
        enc.write_all(b"p cnf 2 1\n1 -2 0\n").unwrap();
        enc.finish().unwrap();
        let reader = open_input(Some(&path)).unwrap();
        let cnf = DimacsCnf::from_reader(reader).unwrap();
        assert_eq!(cnf.clauses, vec![vec![1, -2]]);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(open_input(Some(Path::new("/nonexistent/keel.cnf"))).is_err());
    }
}
