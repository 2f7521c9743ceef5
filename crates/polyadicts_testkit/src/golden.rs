//! Golden files pinning the wire format.
//!
//! Each `<name>.golden` file holds one encoded buffer. A check compares the
//! freshly encoded bytes against the file and then decodes the file itself,
//! so a golden that the current decoder rejects fails just like one that no
//! longer matches the encoder.
//!
//! Set `UPDATE_GOLDEN` to rewrite the files from the current encoder.

use std::fs;
use std::io;
use std::path::PathBuf;

use polyadicts_codec::{Polyad, PolyadError, Polyid};
use thiserror::Error;

use crate::hex::hex_encode;

/// Why a golden check failed.
#[derive(Debug, Error)]
pub enum GoldenError {
    /// No golden file exists yet.
    #[error("golden file {} is missing; encoder produced {actual}", .path.display())]
    Missing {
        /// Expected location of the file.
        path: PathBuf,
        /// Hex of the bytes that were checked.
        actual: String,
    },

    /// The golden file could not be read or written.
    #[error("cannot access golden file {}: {source}", .path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The encoder output differs from the golden bytes.
    #[error("{name}: golden is {expected}, encoder produced {actual}")]
    Mismatch {
        /// Golden name.
        name: String,
        /// Hex of the golden bytes.
        expected: String,
        /// Hex of the encoder output.
        actual: String,
    },

    /// The container under test has no encoded form.
    #[error("{name}: nothing to compare: {source}")]
    Unsealed {
        /// Golden name.
        name: String,
        /// Error from the container.
        #[source]
        source: PolyadError,
    },

    /// The golden bytes no longer decode.
    #[error("{name}: golden does not decode: {source}")]
    Decode {
        /// Golden name.
        name: String,
        /// Decoder error.
        #[source]
        source: PolyadError,
    },

    /// The golden decodes, but to different content.
    #[error("{name}: golden decodes to different content at item {index}")]
    Content {
        /// Golden name.
        name: String,
        /// First differing item.
        index: usize,
    },
}

/// A directory of golden files.
#[derive(Debug, Clone)]
pub struct GoldenDir {
    root: PathBuf,
    update: bool,
}

impl GoldenDir {
    /// Golden files under `root`. Update mode follows `UPDATE_GOLDEN`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            update: std::env::var_os("UPDATE_GOLDEN").is_some(),
        }
    }

    /// The workspace `docs/test_vectors` directory.
    pub fn workspace() -> Self {
        let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .ancestors()
            .nth(2)
            .map(|workspace| workspace.join("docs").join("test_vectors"))
            .unwrap_or_else(|| PathBuf::from("test_vectors"));
        Self::new(root)
    }

    /// Forces update mode on or off.
    #[must_use]
    pub fn updating(mut self, update: bool) -> Self {
        self.update = update;
        self
    }

    /// Location of the golden file `name`.
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.golden"))
    }

    /// Compares `actual` with the golden file and returns the golden bytes.
    ///
    /// In update mode the file is rewritten with `actual` instead.
    pub fn check_bytes(&self, name: &str, actual: &[u8]) -> Result<Vec<u8>, GoldenError> {
        let path = self.path(name);
        if self.update {
            fs::create_dir_all(&self.root)
                .and_then(|()| fs::write(&path, actual))
                .map_err(|source| GoldenError::Io { path, source })?;
            return Ok(actual.to_vec());
        }

        let expected = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(GoldenError::Missing {
                    path,
                    actual: hex_encode(actual),
                })
            }
            Err(source) => return Err(GoldenError::Io { path, source }),
        };
        if expected != actual {
            return Err(GoldenError::Mismatch {
                name: name.into(),
                expected: hex_encode(&expected),
                actual: hex_encode(actual),
            });
        }
        Ok(expected)
    }

    /// Checks a sealed polyad against its golden and reloads the golden at
    /// the polyad's rank.
    pub fn check_polyad(&self, name: &str, pack: &Polyad<'_>) -> Result<(), GoldenError> {
        let actual = pack.whole_view().map_err(|source| GoldenError::Unsealed {
            name: name.into(),
            source,
        })?;
        let golden = self.check_bytes(name, actual)?;

        let reloaded =
            Polyad::load_exact(&golden, pack.rank()).map_err(|source| GoldenError::Decode {
                name: name.into(),
                source,
            })?;
        let mismatch = reloaded.iter().zip(pack.iter()).position(|(a, b)| a != b);
        match mismatch {
            Some(index) => Err(GoldenError::Content {
                name: name.into(),
                index,
            }),
            None => Ok(()),
        }
    }

    /// Checks a polyid against its golden and reloads the golden.
    pub fn check_polyid(&self, name: &str, ids: &Polyid<'_>) -> Result<(), GoldenError> {
        let golden = self.check_bytes(name, ids.as_bytes())?;
        let reloaded =
            Polyid::load_exact(&golden, ids.len()).map_err(|source| GoldenError::Decode {
                name: name.into(),
                source,
            })?;
        match reloaded.values().iter().zip(ids.values()).position(|(a, b)| a != b) {
            Some(index) => Err(GoldenError::Content {
                name: name.into(),
                index,
            }),
            None => Ok(()),
        }
    }

    /// Panicking form of [`GoldenDir::check_polyad`] for tests.
    pub fn assert_polyad(&self, name: &str, pack: &Polyad<'_>) {
        if let Err(err) = self.check_polyad(name, pack) {
            panic!("{err}\nRun with UPDATE_GOLDEN=1 to refresh.");
        }
    }

    /// Panicking form of [`GoldenDir::check_polyid`] for tests.
    pub fn assert_polyid(&self, name: &str, ids: &Polyid<'_>) {
        if let Err(err) = self.check_polyid(name, ids) {
            panic!("{err}\nRun with UPDATE_GOLDEN=1 to refresh.");
        }
    }
}
