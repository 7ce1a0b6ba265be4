use std::{ffi::OsString, path::Path};

use fm_sat::{
    structures::{dimacs::read_dimacs, CNF},
    types::err::ErrorKind,
};

pub enum ReadError {
    NoExtension,
    ParseError(ErrorKind),
    UnknownExtension(OsString),
    FailedToOpen,
}

impl std::fmt::Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self {
            Self::NoExtension => write!(f, "The file does not have an extension."),
            Self::ParseError(err) => write!(f, "Parse error: '{err}'."),
            Self::UnknownExtension(ex) => write!(f, "Unsupported extension '{ex:?}'."),
            Self::FailedToOpen => write!(f, "Failed to open CNF file."),
        }
    }
}

/// Reads the DIMACS file at `path`, decompressing by extension.
pub fn read_formula(path: &Path) -> Result<CNF, ReadError> {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(_) => return Err(ReadError::FailedToOpen),
    };

    let formula = match path.extension() {
        #[cfg(feature = "xz")]
        Some(extension) if extension == "xz" => {
            read_dimacs(std::io::BufReader::new(xz2::read::XzDecoder::new(&file)))
        }

        Some(extension) if extension == "cnf" || extension == "dimacs" => {
            read_dimacs(std::io::BufReader::new(&file))
        }

        Some(unknown) => return Err(ReadError::UnknownExtension(unknown.to_owned())),

        None => return Err(ReadError::NoExtension),
    };

    match formula {
        Ok(cnf) => {
            println!("c Variable count: {}", cnf.variables().size());
            println!("c Clause count:   {}", cnf.clauses().len());
            Ok(cnf)
        }
        Err(e) => Err(ReadError::ParseError(e)),
    }
}
