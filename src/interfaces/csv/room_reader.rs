use crate::domain::room::Room;
use crate::error::{PaymentError, Result};
use std::io::Read;

/// Reads rooms from a CSV source with the header `id,slug,name,price,discount`.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<Room>`.
/// Fields are trimmed and the `discount` column may be left out entirely.
pub struct RoomReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> RoomReader<R> {
    /// Creates a new `RoomReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes rooms.
    pub fn rooms(self) -> impl Iterator<Item = Result<Room>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(PaymentError::from))
    }
}
