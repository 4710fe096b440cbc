use crate::error::MainError;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, MainError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Reads a file line by line, without the trailing newline.
pub fn read_lines(path: &Path) -> Result<Vec<String>, MainError> {
    let file = File::open(path)?;
    Ok(BufReader::new(file)
        .lines()
        .collect::<Result<Vec<_>, _>>()?)
}
