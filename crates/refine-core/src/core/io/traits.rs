use crate::core::models::conformation::Conformation;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing conformation file formats.
///
/// Implementors handle format-specific parsing and serialization; the provided
/// path-based helpers wrap them with buffered file handles.
pub trait StructureFile {
    /// The error type for I/O and parsing failures.
    type Error: Error + From<io::Error>;

    /// Reads a conformation from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or the reader cannot be read.
    fn read_from(reader: &mut impl BufRead) -> Result<Conformation, Self::Error>;

    /// Writes a conformation to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    fn write_to(conformation: &Conformation, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Reads a conformation from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Conformation, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Writes a conformation to a file path, creating or truncating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(
        conformation: &Conformation,
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(conformation, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
