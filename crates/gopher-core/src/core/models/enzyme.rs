use phf::{Map, phf_map};
use std::fmt;
use thiserror::Error;

/// Recognition sites of enzymes commonly used for Capture Hi-C, in caret notation.
#[rustfmt::skip]
static BUILTIN_ENZYMES: Map<&'static str, &'static str> = phf_map! {
    // --- 6-cutters ---
    "HindIII" => "A^AGCTT",
    "EcoRI"   => "G^AATTC",
    "BglII"   => "A^GATCT",
    "BamHI"   => "G^GATCC",
    "NcoI"    => "C^CATGG",
    "XbaI"    => "T^CTAGA",

    // --- 4-cutters ---
    "DpnII"   => "^GATC",
    "MboI"    => "^GATC",
    "Sau3AI"  => "^GATC",
    "NlaIII"  => "CATG^",
    "Csp6I"   => "G^TAC",
    "CviQI"   => "G^TAC",
    "MseI"    => "T^TAA",

    // --- Degenerate sites ---
    "HinfI"   => "G^ANTC",
    "DdeI"    => "C^TNAG",
    "BsaJI"   => "C^CNNGG",
};

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum EnzymeError {
    #[error("Restriction site '{site}' of enzyme '{name}' has no cut marker '^'")]
    MissingCaret { name: String, site: String },
    #[error("Restriction site '{site}' of enzyme '{name}' has more than one cut marker '^'")]
    MultipleCarets { name: String, site: String },
    #[error("Restriction site of enzyme '{0}' is empty")]
    EmptyPattern(String),
    #[error("Restriction site '{site}' of enzyme '{name}' contains the invalid base '{base}'")]
    InvalidBase {
        name: String,
        site: String,
        base: char,
    },
    #[error("Unknown restriction enzyme: '{0}'")]
    UnknownEnzyme(String),
}

/// A restriction enzyme with its recognition pattern and cut offset.
///
/// The cut offset is the 0-based position of the cut inside the pattern, taken from the
/// caret in the enzyme's site notation (`A^AGCTT` cuts at offset 1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestrictionEnzyme {
    name: String,
    site: String,
    pattern: Vec<u8>,
    masks: Vec<u8>,
    cut_offset: usize,
}

impl RestrictionEnzyme {
    /// Parses an enzyme from its name and caret-annotated site.
    ///
    /// # Errors
    ///
    /// Returns an error if the site is empty, lacks exactly one caret, or contains a
    /// character that is not an IUPAC nucleotide code.
    pub fn from_site(name: &str, site: &str) -> Result<Self, EnzymeError> {
        let site = site.trim();
        let carets = site.matches('^').count();
        if carets == 0 {
            return Err(EnzymeError::MissingCaret {
                name: name.to_string(),
                site: site.to_string(),
            });
        }
        if carets > 1 {
            return Err(EnzymeError::MultipleCarets {
                name: name.to_string(),
                site: site.to_string(),
            });
        }

        let cut_offset = site.find('^').unwrap_or(0);
        let pattern: Vec<u8> = site
            .bytes()
            .filter(|&b| b != b'^')
            .map(|b| b.to_ascii_uppercase())
            .collect();
        if pattern.is_empty() {
            return Err(EnzymeError::EmptyPattern(name.to_string()));
        }

        let mut masks = Vec::with_capacity(pattern.len());
        for &base in &pattern {
            match iupac_mask(base) {
                0 => {
                    return Err(EnzymeError::InvalidBase {
                        name: name.to_string(),
                        site: site.to_string(),
                        base: base as char,
                    });
                }
                mask => masks.push(mask),
            }
        }

        Ok(Self {
            name: name.to_string(),
            site: site.to_uppercase(),
            pattern,
            masks,
            cut_offset,
        })
    }

    /// Looks up an enzyme in the built-in catalogue. The lookup ignores case.
    pub fn builtin(name: &str) -> Result<Self, EnzymeError> {
        let (canonical, site) = BUILTIN_ENZYMES
            .entries()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .ok_or_else(|| EnzymeError::UnknownEnzyme(name.to_string()))?;
        Self::from_site(canonical, site)
    }

    /// Returns every enzyme of the built-in catalogue, sorted by name.
    pub fn builtin_catalogue() -> Vec<Self> {
        let mut enzymes: Vec<Self> = BUILTIN_ENZYMES
            .entries()
            .filter_map(|(name, site)| Self::from_site(name, site).ok())
            .collect();
        enzymes.sort_by(|a, b| a.name.cmp(&b.name));
        enzymes
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The site in caret notation, upper-cased.
    pub fn site(&self) -> &str {
        &self.site
    }

    /// The recognition pattern without the caret.
    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    pub fn cut_offset(&self) -> usize {
        self.cut_offset
    }

    /// Checks whether the recognition pattern occurs at the 0-based offset `start` of
    /// `sequence`. Matching ignores case, honours IUPAC codes in the pattern and never
    /// matches an ambiguous base in the sequence.
    #[inline]
    pub fn matches_at(&self, sequence: &[u8], start: usize) -> bool {
        let Some(window) = sequence.get(start..start + self.masks.len()) else {
            return false;
        };
        window
            .iter()
            .zip(&self.masks)
            .all(|(&base, &mask)| SEQUENCE_MASKS[base as usize] & mask != 0)
    }
}

impl fmt::Display for RestrictionEnzyme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.site)
    }
}

const fn sequence_masks() -> [u8; 256] {
    let mut table = [0u8; 256];
    table[b'A' as usize] = 0b0001;
    table[b'a' as usize] = 0b0001;
    table[b'C' as usize] = 0b0010;
    table[b'c' as usize] = 0b0010;
    table[b'G' as usize] = 0b0100;
    table[b'g' as usize] = 0b0100;
    table[b'T' as usize] = 0b1000;
    table[b't' as usize] = 0b1000;
    table
}

static SEQUENCE_MASKS: [u8; 256] = sequence_masks();

fn iupac_mask(base: u8) -> u8 {
    match base {
        b'A' => 0b0001,
        b'C' => 0b0010,
        b'G' => 0b0100,
        b'T' => 0b1000,
        b'R' => 0b0101,
        b'Y' => 0b1010,
        b'S' => 0b0110,
        b'W' => 0b1001,
        b'K' => 0b1100,
        b'M' => 0b0011,
        b'B' => 0b1110,
        b'D' => 0b1101,
        b'H' => 0b1011,
        b'V' => 0b0111,
        b'N' => 0b1111,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caret_position_sets_cut_offset() {
        let hind3 = RestrictionEnzyme::from_site("HindIII", "A^AGCTT").unwrap();
        assert_eq!(hind3.cut_offset(), 1);
        assert_eq!(hind3.pattern(), b"AAGCTT");

        let dpn2 = RestrictionEnzyme::from_site("DpnII", "^GATC").unwrap();
        assert_eq!(dpn2.cut_offset(), 0);

        let nla3 = RestrictionEnzyme::from_site("NlaIII", "CATG^").unwrap();
        assert_eq!(nla3.cut_offset(), 4);
    }

    #[test]
    fn site_without_caret_is_rejected() {
        let result = RestrictionEnzyme::from_site("Bad", "AAGCTT");
        assert!(matches!(result, Err(EnzymeError::MissingCaret { .. })));
    }

    #[test]
    fn site_with_two_carets_is_rejected() {
        let result = RestrictionEnzyme::from_site("Bad", "A^AG^CTT");
        assert!(matches!(result, Err(EnzymeError::MultipleCarets { .. })));
    }

    #[test]
    fn site_with_invalid_character_is_rejected() {
        let result = RestrictionEnzyme::from_site("Bad", "A^AGXTT");
        assert!(matches!(
            result,
            Err(EnzymeError::InvalidBase { base: 'X', .. })
        ));
    }

    #[test]
    fn bare_caret_is_an_empty_pattern() {
        let result = RestrictionEnzyme::from_site("Bad", "^");
        assert_eq!(result, Err(EnzymeError::EmptyPattern("Bad".to_string())));
    }

    #[test]
    fn matching_ignores_case() {
        let hind3 = RestrictionEnzyme::from_site("HindIII", "A^AGCTT").unwrap();
        assert!(hind3.matches_at(b"aagctt", 0));
        assert!(hind3.matches_at(b"TTAaGcTt", 2));
        assert!(!hind3.matches_at(b"AAGCTA", 0));
    }

    #[test]
    fn match_past_end_of_sequence_fails() {
        let hind3 = RestrictionEnzyme::from_site("HindIII", "A^AGCTT").unwrap();
        assert!(!hind3.matches_at(b"AAGCT", 0));
        assert!(!hind3.matches_at(b"AAGCTT", 1));
    }

    #[test]
    fn degenerate_pattern_matches_any_compatible_base() {
        let hinf1 = RestrictionEnzyme::from_site("HinfI", "G^ANTC").unwrap();
        assert!(hinf1.matches_at(b"GAATC", 0));
        assert!(hinf1.matches_at(b"GACTC", 0));
        assert!(hinf1.matches_at(b"GAgTC", 0));
        assert!(!hinf1.matches_at(b"GAATG", 0));
    }

    #[test]
    fn ambiguous_sequence_base_never_matches() {
        let hinf1 = RestrictionEnzyme::from_site("HinfI", "G^ANTC").unwrap();
        assert!(!hinf1.matches_at(b"GANTC", 0));
    }

    #[test]
    fn builtin_lookup_ignores_case() {
        let enzyme = RestrictionEnzyme::builtin("hindiii").unwrap();
        assert_eq!(enzyme.name(), "HindIII");
        assert_eq!(enzyme.site(), "A^AGCTT");
        assert!(matches!(
            RestrictionEnzyme::builtin("NotAnEnzyme"),
            Err(EnzymeError::UnknownEnzyme(_))
        ));
    }

    #[test]
    fn builtin_catalogue_is_sorted_and_complete() {
        let catalogue = RestrictionEnzyme::builtin_catalogue();
        assert_eq!(catalogue.len(), BUILTIN_ENZYMES.len());
        assert!(catalogue.windows(2).all(|w| w[0].name() <= w[1].name()));
    }
}
