use std::fs;
use std::path::Path;

use camino::{Utf8Path, Utf8PathBuf};

use crate::domain::{Accession, parse_accession_list};
use crate::error::FetchError;

pub fn read_accession_list(path: &Path) -> Result<Vec<Accession>, FetchError> {
    if !path.is_file() {
        return Err(FetchError::MissingAccessionList(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|err| FetchError::AccessionListRead {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    Ok(parse_accession_list(&content))
}

pub fn utf8_dir(path: &Path) -> Result<Utf8PathBuf, FetchError> {
    Utf8PathBuf::from_path_buf(path.to_path_buf()).map_err(FetchError::NonUtf8Path)
}

pub fn ensure_output_dir(dir: &Utf8Path) -> Result<(), FetchError> {
    fs::create_dir_all(dir.as_std_path()).map_err(|err| FetchError::OutputDir {
        path: dir.as_std_path().to_path_buf(),
        message: err.to_string(),
    })
}
