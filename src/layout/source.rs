//! Page-extraction collaborator seam.
//!
//! The engine never reads document bytes. Pages come from a [`PageSource`],
//! which may fail for individual pages without affecting the others.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{DocumentInput, PageInput};

/// Provides extracted page geometry.
pub trait PageSource {
    /// Document name, if known.
    fn name(&self) -> Option<&str> {
        None
    }

    /// Numbers of the pages this source can provide, in document order.
    fn page_numbers(&self) -> Vec<u32>;

    /// Extract one page (1-indexed).
    fn page(&self, number: u32) -> Result<PageInput>;
}

/// A source backed by extraction output serialized as JSON.
#[derive(Debug, Clone)]
pub struct JsonSource {
    document: DocumentInput,
}

impl JsonSource {
    /// Wrap an already-decoded document.
    pub fn new(document: DocumentInput) -> Self {
        Self { document }
    }

    /// Decode from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(Self::new(serde_json::from_reader(reader)?))
    }

    /// Decode from bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        Ok(Self::new(serde_json::from_slice(data)?))
    }

    /// Decode from a file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Borrow the decoded document.
    pub fn document(&self) -> &DocumentInput {
        &self.document
    }

    /// Take the decoded document.
    pub fn into_inner(self) -> DocumentInput {
        self.document
    }
}

impl PageSource for JsonSource {
    fn name(&self) -> Option<&str> {
        self.document.name.as_deref()
    }

    fn page_numbers(&self) -> Vec<u32> {
        self.document.pages.iter().map(|p| p.number).collect()
    }

    fn page(&self, number: u32) -> Result<PageInput> {
        self.document
            .pages
            .iter()
            .find(|p| p.number == number)
            .cloned()
            .ok_or(Error::PageOutOfRange(number, self.document.page_count()))
    }
}
