//! Binary persistence for trees, populations, sessions, and training sets.
//!
//! All integers are little-endian. Operations are stored only as indices
//! into the library supplied at save time; the same library, in the same
//! order, must be supplied at load time.
//!
//! ```text
//! population : version u16 (= 0) | size i32 | tree * size
//! tree       : op i32 (-1 = identity) | children i32 | tree * children
//! session    : 0x8000 u16 | generation u32 | population
//! training   : cases i32 | (outputs i32 | input str | str * outputs) * cases
//! str        : 7-bit varint byte length | UTF-8 bytes
//! ```
//!
//! Every reader builds a new value from scratch, so a failed load leaves
//! the caller's existing state alone.

use crate::error::{ConfigError, PersistError, PersistResult};
use crate::gp::evolution::Session;
use crate::gp::operation::{OpRef, OperationLibrary};
use crate::gp::population::Population;
use crate::gp::training::{TrainingCase, TrainingSet};
use crate::gp::tree::ProgramTree;
use std::fs;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Population format version written by this crate.
pub const POPULATION_VERSION: u16 = 0;

/// Versions at or above this value belong to wrapper formats.
pub const WRAPPER_VERSION_FLOOR: u16 = 0x8000;

/// Version marker of the session wrapper.
pub const SESSION_VERSION: u16 = 0x8000;

/// On-disk index of the bottom-node identity operation.
const IDENTITY_INDEX: i32 = -1;

/// Upper bound on speculative preallocation from untrusted counts.
const MAX_PREALLOC: usize = 1024;

/// Deepest tree accepted by [`read_tree`] and [`write_tree`]. The root is depth 1.
pub const MAX_TREE_DEPTH: usize = 1024;

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

fn write_u16<W: Write>(w: &mut W, value: u16) -> PersistResult<()> {
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_i32<W: Write>(w: &mut W, value: i32) -> PersistResult<()> {
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn read_u16<R: Read>(r: &mut R) -> PersistResult<u16> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf).map_err(PersistError::from_read)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_i32<R: Read>(r: &mut R) -> PersistResult<i32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf).map_err(PersistError::from_read)?;
    Ok(i32::from_le_bytes(buf))
}

/// Generation counters are stored as a raw 32-bit field. Values past
/// `i32::MAX`, which older writers stored as negative numbers, read back as
/// their unsigned value.
fn write_u32<W: Write>(w: &mut W, value: u32) -> PersistResult<()> {
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn read_u32<R: Read>(r: &mut R) -> PersistResult<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf).map_err(PersistError::from_read)?;
    Ok(u32::from_le_bytes(buf))
}

fn write_count<W: Write>(w: &mut W, what: &'static str, value: usize) -> PersistResult<()> {
    let value = i32::try_from(value).map_err(|_| PersistError::CountOverflow { what, value })?;
    write_i32(w, value)
}

fn read_count<R: Read>(r: &mut R, what: &'static str) -> PersistResult<usize> {
    let value = read_i32(r)?;
    usize::try_from(value).map_err(|_| PersistError::NegativeCount { what, value })
}

fn write_string<W: Write>(w: &mut W, s: &str) -> PersistResult<()> {
    let mut len = s.len();
    loop {
        // Low seven bits per byte, high bit set while more bytes follow.
        #[allow(clippy::cast_possible_truncation)]
        let mut byte = (len & 0x7f) as u8;
        len >>= 7;
        if len != 0 {
            byte |= 0x80;
        }
        w.write_all(&[byte])?;
        if len == 0 {
            break;
        }
    }
    w.write_all(s.as_bytes())?;
    Ok(())
}

fn read_string<R: Read>(r: &mut R) -> PersistResult<String> {
    let mut len = 0usize;
    let mut shift = 0u32;
    loop {
        if shift >= 35 {
            return Err(PersistError::BadLengthPrefix);
        }
        let mut byte = [0u8; 1];
        r.read_exact(&mut byte).map_err(PersistError::from_read)?;
        len |= usize::from(byte[0] & 0x7f) << shift;
        if byte[0] & 0x80 == 0 {
            break;
        }
        shift += 7;
    }
    let mut bytes = Vec::with_capacity(len.min(MAX_PREALLOC));
    r.by_ref()
        .take(len as u64)
        .read_to_end(&mut bytes)
        .map_err(PersistError::from_read)?;
    if bytes.len() != len {
        return Err(PersistError::UnexpectedEof);
    }
    Ok(String::from_utf8(bytes)?)
}

// ---------------------------------------------------------------------------
// Trees
// ---------------------------------------------------------------------------

/// Write one tree: operation index, child count, then each child in order.
///
/// # Errors
///
/// Returns [`PersistError::OperationNotInLibrary`] if a node refers past the
/// end of `library`, [`PersistError::TreeTooDeep`] if the tree is deeper
/// than [`MAX_TREE_DEPTH`], or an I/O error.
pub fn write_tree<W: Write>(w: &mut W, tree: &ProgramTree, library: &OperationLibrary) -> PersistResult<()> {
    write_node(w, tree, library, 1)
}

fn write_node<W: Write>(w: &mut W, tree: &ProgramTree, library: &OperationLibrary, depth: usize) -> PersistResult<()> {
    if depth > MAX_TREE_DEPTH {
        return Err(PersistError::TreeTooDeep(MAX_TREE_DEPTH));
    }
    let index = match tree.op() {
        OpRef::Identity => IDENTITY_INDEX,
        OpRef::Library(i) if i < library.len() => {
            i32::try_from(i).map_err(|_| PersistError::OperationNotInLibrary(i))?
        }
        OpRef::Library(i) => return Err(PersistError::OperationNotInLibrary(i)),
    };
    write_i32(w, index)?;
    write_count(w, "child", tree.children().len())?;
    for child in tree.children() {
        write_node(w, child, library, depth + 1)?;
    }
    Ok(())
}

/// Read one tree written by [`write_tree`].
///
/// # Errors
///
/// Returns an error if the stream ends early, an index is outside
/// `library`, a child count is negative, or nesting goes deeper than
/// [`MAX_TREE_DEPTH`].
pub fn read_tree<R: Read>(r: &mut R, library: &OperationLibrary) -> PersistResult<ProgramTree> {
    read_node(r, library, 1)
}

fn read_node<R: Read>(r: &mut R, library: &OperationLibrary, depth: usize) -> PersistResult<ProgramTree> {
    if depth > MAX_TREE_DEPTH {
        return Err(PersistError::TreeTooDeep(MAX_TREE_DEPTH));
    }
    let index = read_i32(r)?;
    let op = match index {
        IDENTITY_INDEX => OpRef::Identity,
        i => match usize::try_from(i) {
            Ok(i) if i < library.len() => OpRef::Library(i),
            _ => {
                return Err(PersistError::OperationIndexOutOfRange {
                    index,
                    len: library.len(),
                });
            }
        },
    };
    let count = read_count(r, "child")?;
    let mut children = Vec::with_capacity(count.min(MAX_PREALLOC));
    for _ in 0..count {
        children.push(read_node(r, library, depth + 1)?);
    }
    Ok(ProgramTree::new(op, children))
}

// ---------------------------------------------------------------------------
// Populations
// ---------------------------------------------------------------------------

/// Write a population in the current format.
///
/// # Errors
///
/// Returns an error if any tree cannot be encoded or writing fails.
pub fn write_population<W: Write>(w: &mut W, population: &Population, library: &OperationLibrary) -> PersistResult<()> {
    write_population_version(w, population, library, POPULATION_VERSION)
}

/// Write a population, requesting a specific format version.
///
/// # Errors
///
/// Returns [`PersistError::ReservedVersion`] for wrapper versions and
/// [`PersistError::UnsupportedVersion`] for any other version this crate
/// cannot produce.
pub fn write_population_version<W: Write>(
    w: &mut W,
    population: &Population,
    library: &OperationLibrary,
    version: u16,
) -> PersistResult<()> {
    if version >= WRAPPER_VERSION_FLOOR {
        return Err(PersistError::ReservedVersion(version));
    }
    if version != POPULATION_VERSION {
        return Err(PersistError::UnsupportedVersion(version));
    }
    write_u16(w, version)?;
    write_count(w, "population", population.size())?;
    for tree in population.trees() {
        write_tree(w, tree, library)?;
    }
    Ok(())
}

/// Read a population written by [`write_population`].
///
/// # Errors
///
/// Returns [`PersistError::UnsupportedVersion`] for any nonzero version,
/// or any tree decoding error.
pub fn read_population<R: Read>(r: &mut R, library: &OperationLibrary) -> PersistResult<Population> {
    let version = read_u16(r)?;
    if version != POPULATION_VERSION {
        return Err(PersistError::UnsupportedVersion(version));
    }
    let size = read_count(r, "population")?;
    if size == 0 {
        return Err(ConfigError::InvalidSize(0).into());
    }
    let mut trees = Vec::with_capacity(size.min(MAX_PREALLOC));
    for _ in 0..size {
        trees.push(read_tree(r, library)?);
    }
    Ok(Population::from_trees(trees))
}

/// Encode a population into a byte vector.
///
/// # Errors
///
/// See [`write_population`].
pub fn encode_population(population: &Population, library: &OperationLibrary) -> PersistResult<Vec<u8>> {
    let mut bytes = Vec::new();
    write_population(&mut bytes, population, library)?;
    Ok(bytes)
}

/// Decode a population from bytes.
///
/// # Errors
///
/// See [`read_population`].
pub fn decode_population(mut bytes: &[u8], library: &OperationLibrary) -> PersistResult<Population> {
    read_population(&mut bytes, library)
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// Write a session: wrapper version, generation counter, population.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn write_session<W: Write>(w: &mut W, session: &Session, library: &OperationLibrary) -> PersistResult<()> {
    write_u16(w, SESSION_VERSION)?;
    write_u32(w, session.generation)?;
    write_population(w, &session.population, library)
}

/// Read a session written by [`write_session`].
///
/// # Errors
///
/// Returns [`PersistError::UnsupportedVersion`] if the wrapper version is
/// not [`SESSION_VERSION`], or any population decoding error.
pub fn read_session<R: Read>(r: &mut R, library: &OperationLibrary) -> PersistResult<Session> {
    let version = read_u16(r)?;
    if version != SESSION_VERSION {
        return Err(PersistError::UnsupportedVersion(version));
    }
    let generation = read_u32(r)?;
    let population = read_population(r, library)?;
    Ok(Session {
        generation,
        population,
    })
}

/// Save a session to a file, replacing it.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_session(session: &Session, library: &OperationLibrary, path: &Path) -> PersistResult<()> {
    let mut w = BufWriter::new(fs::File::create(path)?);
    write_session(&mut w, session, library)?;
    w.flush()?;
    log::info!(
        "saved {} trees at generation {} to {}",
        session.population.size(),
        session.generation,
        path.display()
    );
    Ok(())
}

/// Load a session from a file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or decoded.
pub fn load_session(library: &OperationLibrary, path: &Path) -> PersistResult<Session> {
    let mut r = BufReader::new(fs::File::open(path)?);
    let session = read_session(&mut r, library)?;
    log::info!(
        "loaded {} trees at generation {} from {}",
        session.population.size(),
        session.generation,
        path.display()
    );
    Ok(session)
}

// ---------------------------------------------------------------------------
// Training sets
// ---------------------------------------------------------------------------

/// Write a training set.
///
/// # Errors
///
/// Returns an error if a count does not fit or writing fails.
pub fn write_training_set<W: Write>(w: &mut W, set: &TrainingSet) -> PersistResult<()> {
    write_count(w, "case", set.len())?;
    for case in set.cases() {
        write_count(w, "output", case.acceptable.len())?;
        write_string(w, &case.input)?;
        for output in &case.acceptable {
            write_string(w, output)?;
        }
    }
    Ok(())
}

/// Read a training set written by [`write_training_set`].
///
/// # Errors
///
/// Returns an error if the stream is truncated, malformed, or holds no cases.
pub fn read_training_set<R: Read>(r: &mut R) -> PersistResult<TrainingSet> {
    let count = read_count(r, "case")?;
    let mut cases = Vec::with_capacity(count.min(MAX_PREALLOC));
    for _ in 0..count {
        let outputs = read_count(r, "output")?;
        let input = read_string(r)?;
        let mut acceptable = Vec::with_capacity(outputs.min(MAX_PREALLOC));
        for _ in 0..outputs {
            acceptable.push(read_string(r)?);
        }
        cases.push(TrainingCase { input, acceptable });
    }
    Ok(TrainingSet::new(cases)?)
}

/// Save a training set to a file, replacing it.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_training_file(set: &TrainingSet, path: &Path) -> PersistResult<()> {
    let mut w = BufWriter::new(fs::File::create(path)?);
    write_training_set(&mut w, set)?;
    w.flush()?;
    log::info!("saved {} training cases to {}", set.len(), path.display());
    Ok(())
}

/// Load a training set from a file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or decoded.
pub fn load_training_file(path: &Path) -> PersistResult<TrainingSet> {
    let mut r = BufReader::new(fs::File::open(path)?);
    let set = read_training_set(&mut r)?;
    log::info!("loaded {} training cases from {}", set.len(), path.display());
    Ok(set)
}
