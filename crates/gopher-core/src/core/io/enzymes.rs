use crate::core::models::enzyme::{EnzymeError, RestrictionEnzyme};
use std::io::Read;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnzymeTableError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Enzyme table '{path}' line {line}: expected 'name<TAB>site'")]
    MissingColumn { path: String, line: u64 },
    #[error("Enzyme table '{path}' line {line}: {source}")]
    InvalidSite {
        path: String,
        line: u64,
        source: EnzymeError,
    },
    #[error("Enzyme '{name}' is defined twice in '{path}'")]
    DuplicateEnzyme { path: String, name: String },
}

/// A named collection of restriction enzymes, either read from a tab-separated table or the
/// built-in catalogue.
#[derive(Debug, Clone, Default)]
pub struct EnzymeTable {
    enzymes: Vec<RestrictionEnzyme>,
}

impl EnzymeTable {
    pub fn builtin() -> Self {
        Self {
            enzymes: RestrictionEnzyme::builtin_catalogue(),
        }
    }

    /// Loads `name<TAB>site` rows. Blank lines, `#` comments and a leading `name site`
    /// header row are skipped.
    pub fn load(path: &Path) -> Result<Self, EnzymeTableError> {
        let path_str = path.to_string_lossy().to_string();
        let file = std::fs::File::open(path).map_err(|e| EnzymeTableError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        Self::read_from(file, &path_str)
    }

    pub fn read_from(reader: impl Read, source_name: &str) -> Result<Self, EnzymeTableError> {
        let mut rows = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut enzymes: Vec<RestrictionEnzyme> = Vec::new();
        for (index, row) in rows.records().enumerate() {
            let row = row.map_err(|e| EnzymeTableError::Csv {
                path: source_name.to_string(),
                source: e,
            })?;
            let line = row
                .position()
                .map(|p| p.line())
                .unwrap_or(index as u64 + 1);
            if row.iter().all(str::is_empty) {
                continue;
            }
            let (Some(name), Some(site)) = (row.get(0), row.get(1)) else {
                return Err(EnzymeTableError::MissingColumn {
                    path: source_name.to_string(),
                    line,
                });
            };
            if index == 0 && name.eq_ignore_ascii_case("name") && site.eq_ignore_ascii_case("site")
            {
                continue;
            }
            let enzyme = RestrictionEnzyme::from_site(name, site).map_err(|source| {
                EnzymeTableError::InvalidSite {
                    path: source_name.to_string(),
                    line,
                    source,
                }
            })?;
            if enzymes.iter().any(|e| e.name() == enzyme.name()) {
                return Err(EnzymeTableError::DuplicateEnzyme {
                    path: source_name.to_string(),
                    name: enzyme.name().to_string(),
                });
            }
            enzymes.push(enzyme);
        }
        Ok(Self { enzymes })
    }

    pub fn enzymes(&self) -> &[RestrictionEnzyme] {
        &self.enzymes
    }

    /// Case-insensitive lookup by name.
    pub fn get(&self, name: &str) -> Option<&RestrictionEnzyme> {
        self.enzymes
            .iter()
            .find(|e| e.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Resolves enzyme names in the given order.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<RestrictionEnzyme>, EnzymeError> {
        names
            .iter()
            .map(|name| {
                self.get(name.as_ref())
                    .cloned()
                    .ok_or_else(|| EnzymeError::UnknownEnzyme(name.as_ref().to_string()))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.enzymes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enzymes.is_empty()
    }
}
