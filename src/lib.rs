//! Batch retrieval of paired-end FASTQ files from the ENA FTP archive.
//!
//! [`app::App`] reads an accession list, derives the two mate-file paths for
//! every accession and copies them over a single [`ena::ArchiveSession`] into
//! an output directory. Individual transfer failures are recorded in the
//! [`app::BatchReport`] and never stop the batch.

pub mod app;
pub mod config;
pub mod domain;
pub mod ena;
pub mod error;
pub mod fs_util;
pub mod output;
