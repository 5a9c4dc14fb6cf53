//! Routing guide files.
//!
//! A control file lists one `<net name> <guide file>` pair per line. Guide
//! file paths are resolved relative to the control file's directory. Each
//! guide file starts with a `<num x> <num y> <range>` header followed by one
//! probability per line for every cell, x outer and y inner.
//!
//! Blank lines are ignored in both kinds of file.

use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::builder::CirBuilder;
use crate::config::CirDbConfig;
use crate::error::Error;
use crate::net::NetId;

/// A malformed or unreadable guide file.
#[derive(thiserror::Error, Debug)]
pub enum GuideError {
    /// A file could not be read.
    #[error("failed to read {path:?}")]
    Io {
        /// The file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// A line with the wrong number of whitespace-separated tokens.
    #[error("{path:?}:{line}: expected {expected} tokens, found {found}")]
    TokenCount {
        /// The file.
        path: PathBuf,
        /// The 1-based line number.
        line: usize,
        /// The number of tokens required.
        expected: usize,
        /// The number of tokens found.
        found: usize,
    },
    /// A token that is not a valid integer.
    #[error("{path:?}:{line}: invalid integer `{token}`")]
    InvalidInt {
        /// The file.
        path: PathBuf,
        /// The 1-based line number.
        line: usize,
        /// The offending token.
        token: String,
        /// The underlying error.
        #[source]
        source: ParseIntError,
    },
    /// A guide file without a header line.
    #[error("{path:?}: missing guide header")]
    MissingHeader {
        /// The file.
        path: PathBuf,
    },
    /// A guide file with fewer values than its header declares.
    #[error("{path:?}: expected {expected} guide values, found {found}")]
    Truncated {
        /// The file.
        path: PathBuf,
        /// The number of values declared by the header.
        expected: usize,
        /// The number of values present.
        found: usize,
    },
    /// The database rejected the guide data.
    #[error(transparent)]
    Db(#[from] Error),
}

/// Reads routing guides into a database.
pub struct GuideReader<'a, B: ?Sized> {
    db: &'a mut B,
}

impl<'a, B: CirBuilder + ?Sized> GuideReader<'a, B> {
    /// Creates a reader that populates `db`.
    pub fn new(db: &'a mut B) -> Self {
        Self { db }
    }

    /// Reads every guide listed in the control file at `control`, then
    /// finalizes the routing guide.
    ///
    /// Guides for nets the database does not contain are skipped with a
    /// warning. Returns the number of guide files read.
    pub fn parse(&mut self, control: impl AsRef<Path>) -> Result<usize, GuideError> {
        let control = control.as_ref();
        let contents = read(control)?;
        let base = control.parent().unwrap_or(Path::new(""));

        let mut num_read = 0;
        for (idx, line) in contents.lines().enumerate() {
            let tokens = tokens(line);
            if tokens.is_empty() {
                continue;
            }
            let &[name, file] = tokens.as_slice() else {
                return Err(GuideError::TokenCount {
                    path: control.to_path_buf(),
                    line: idx + 1,
                    expected: 2,
                    found: tokens.len(),
                });
            };
            let Some(net) = self.db.find_net(name) else {
                tracing::warn!(
                    net = %name,
                    path = ?control,
                    "guide names an unknown net, skipping"
                );
                continue;
            };
            self.read_guide(net, &base.join(file))?;
            num_read += 1;
        }

        self.db.finalize_route_guide()?;
        tracing::info!(num_read, path = ?control, "read routing guides");
        Ok(num_read)
    }

    fn read_guide(&mut self, net: NetId, path: &Path) -> Result<(), GuideError> {
        let contents = read(path)?;
        let mut lines = contents
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, tokens(line)))
            .filter(|(_, tokens)| !tokens.is_empty());

        let (line, header) = lines.next().ok_or_else(|| GuideError::MissingHeader {
            path: path.to_path_buf(),
        })?;
        let [num_x, num_y, range] = expect_tokens::<3>(&header, path, line)?;
        let num_x: usize = parse_int(num_x, path, line)?;
        let num_y: usize = parse_int(num_y, path, line)?;
        let range: i64 = parse_int(range, path, line)?;

        let values: Vec<_> = lines.collect();
        // checked before the grids are allocated
        if let Some(expected) = num_x.checked_mul(num_y).filter(|&n| values.len() < n) {
            return Err(GuideError::Truncated {
                path: path.to_path_buf(),
                expected,
                found: values.len(),
            });
        }

        let num_nets = self.db.num_nets();
        let guide = self.db.route_guide_mut();
        guide.ensure_init(num_x, num_y, range, num_nets)?;

        let cells = (0..num_x).flat_map(|x| (0..num_y).map(move |y| (x, y)));
        for ((x, y), (line, tokens)) in cells.zip(values) {
            let [value] = expect_tokens::<1>(&tokens, path, line)?;
            guide.set_guide(parse_int(value, path, line)?, net, x, y)?;
        }
        guide.set_net_has_guide(net, true)?;
        tracing::debug!(?net, ?path, num_x, num_y, "read guide file");
        Ok(())
    }
}

/// Reads the guide control file named in `config`, if there is one,
/// and applies the configured enable flag.
///
/// Returns `true` if a control file was read.
pub fn read_configured<B: CirBuilder + ?Sized>(
    db: &mut B,
    config: &CirDbConfig,
) -> Result<bool, GuideError> {
    db.route_guide_mut().set_enable(config.route_guide.enable);
    let Some(control) = config.route_guide.control_file.as_ref() else {
        return Ok(false);
    };
    GuideReader::new(db).parse(control)?;
    Ok(true)
}

fn read(path: &Path) -> Result<String, GuideError> {
    std::fs::read_to_string(path).map_err(|source| GuideError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn tokens(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

fn expect_tokens<'s, const N: usize>(
    tokens: &[&'s str],
    path: &Path,
    line: usize,
) -> Result<[&'s str; N], GuideError> {
    <[&str; N]>::try_from(tokens).map_err(|_| GuideError::TokenCount {
        path: path.to_path_buf(),
        line,
        expected: N,
        found: tokens.len(),
    })
}

fn parse_int<T: FromStr<Err = ParseIntError>>(
    token: &str,
    path: &Path,
    line: usize,
) -> Result<T, GuideError> {
    token.parse().map_err(|source| GuideError::InvalidInt {
        path: path.to_path_buf(),
        line,
        token: token.to_string(),
        source,
    })
}
