//! Variant-to-canonical test name dictionary.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use lazy_static::lazy_static;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::error::{DictionaryError, Result};

lazy_static! {
    static ref BUILTIN: Arc<CanonicalDictionary> =
        Arc::new(CanonicalDictionary::new(builtin_entries()).unwrap());
}

/// Immutable many-to-one map from name variants to canonical test names.
///
/// Variants are indexed by their normalized form (see [`normalize_name`]).
/// Every canonical name is also a variant of itself.
#[derive(Debug, Clone)]
pub struct CanonicalDictionary {
    entries: Vec<(String, Vec<String>)>,
    variants: Vec<(String, usize)>,
    exact: HashMap<String, usize>,
}

impl CanonicalDictionary {
    /// Build a dictionary from `(canonical, variants)` entries.
    pub fn new<I, S, V>(entries: I) -> std::result::Result<Self, DictionaryError>
    where
        I: IntoIterator<Item = (S, V)>,
        S: Into<String>,
        V: IntoIterator,
        V::Item: Into<String>,
    {
        let mut dictionary = Self {
            entries: Vec::new(),
            variants: Vec::new(),
            exact: HashMap::new(),
        };

        for (canonical, variants) in entries {
            let canonical: String = canonical.into().trim().to_string();
            if normalize_name(&canonical).is_empty() {
                return Err(DictionaryError::EmptyName(canonical));
            }
            let variants: Vec<String> = variants.into_iter().map(Into::into).collect();

            let index = dictionary.entries.len();
            for variant in std::iter::once(&canonical).chain(variants.iter()) {
                dictionary.insert(variant, index, &canonical)?;
            }
            dictionary.entries.push((canonical, variants));
        }

        if dictionary.entries.is_empty() {
            return Err(DictionaryError::Empty);
        }

        Ok(dictionary)
    }

    fn insert(
        &mut self,
        variant: &str,
        index: usize,
        canonical: &str,
    ) -> std::result::Result<(), DictionaryError> {
        let normalized = normalize_name(variant);
        if normalized.is_empty() {
            return Ok(());
        }

        match self.exact.get(&normalized) {
            Some(&existing) if existing == index => Ok(()),
            Some(&existing) => Err(DictionaryError::Conflict {
                variant: normalized,
                first: self.canonical_name(existing).to_string(),
                second: canonical.to_string(),
            }),
            None => {
                self.exact.insert(normalized.clone(), index);
                self.variants.push((normalized, index));
                Ok(())
            }
        }
    }

    /// The built-in Czech/English laboratory dictionary, built once and shared.
    pub fn builtin() -> Arc<Self> {
        Arc::clone(&BUILTIN)
    }

    /// Parse a JSON object of `{"Canonical": ["variant", ...]}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: BTreeMap<String, Vec<String>> = serde_json::from_str(json)?;
        Ok(Self::new(entries)?)
    }

    /// Load a JSON dictionary file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Canonical name for an exact (normalized) variant hit.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.exact
            .get(&normalize_name(name))
            .map(|&index| self.canonical_name(index))
    }

    /// Canonical name for an already normalized variant.
    pub(crate) fn lookup_normalized(&self, normalized: &str) -> Option<&str> {
        self.exact
            .get(normalized)
            .map(|&index| self.canonical_name(index))
    }

    /// All `(normalized variant, canonical name)` pairs.
    pub fn variants(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variants
            .iter()
            .map(|(variant, index)| (variant.as_str(), self.canonical_name(*index)))
    }

    /// Canonical names with the variants they were declared with.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(canonical, variants)| (canonical.as_str(), variants.as_slice()))
    }

    /// Number of canonical names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn canonical_name(&self, index: usize) -> &str {
        &self.entries[index].0
    }
}

/// Lower-case, strip diacritics, turn punctuation into spaces and collapse
/// whitespace.
pub fn normalize_name(name: &str) -> String {
    let folded: String = name
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn builtin_entries() -> Vec<(&'static str, Vec<&'static str>)> {
    vec![
        // Renal
        ("Urea", vec!["močovina", "s urea", "urea v séru"]),
        ("Kreatinin", vec!["creatinine", "kreat", "s kreatinin"]),
        ("Kyselina močová", vec!["uric acid", "ak. močová", "kys. močová", "urát"]),
        ("eGFR", vec!["odhad GF", "glomerulární filtrace", "GFR CKD-EPI"]),
        // Electrolytes
        ("Sodík", vec!["sodium", "Na"]),
        ("Draslík", vec!["potassium", "K"]),
        ("Chloridy", vec!["chloride", "Cl"]),
        ("Vápník", vec!["calcium", "Ca", "vápník celkový"]),
        ("Fosfor", vec!["fosfáty", "phosphate", "P"]),
        ("Hořčík", vec!["magnesium", "Mg"]),
        // Metabolic
        ("Glukóza", vec!["glucose", "glykémie", "glykemie nalačno"]),
        ("HbA1c", vec!["glykovaný hemoglobin", "glycated hemoglobin"]),
        ("Cholesterol", vec!["cholesterol celkový", "total cholesterol", "CHOL"]),
        ("HDL cholesterol", vec!["HDL", "HDL-C"]),
        ("LDL cholesterol", vec!["LDL", "LDL-C"]),
        ("Triacylglyceroly", vec!["triglyceridy", "triglycerides", "TAG", "TG"]),
        // Liver
        ("Bilirubin celkový", vec!["bilirubin", "total bilirubin", "bilirubin total"]),
        ("ALT", vec!["alaninaminotransferáza", "alanin aminotransferáza", "ALAT"]),
        ("AST", vec!["aspartátaminotransferáza", "aspartát aminotransferáza", "ASAT"]),
        ("GGT", vec!["GMT", "gama GT", "gamma GT", "gama-glutamyltransferáza"]),
        ("ALP", vec!["alkalická fosfatáza", "alkaline phosphatase", "ALKP"]),
        ("Celková bílkovina", vec!["bílkovina celková", "total protein", "CB"]),
        ("Albumin", vec!["ALB"]),
        // Pancreas
        ("Amyláza", vec!["amylase", "AMS"]),
        ("Lipáza", vec!["lipase", "LPS"]),
        ("Laktátdehydrogenáza", vec!["LD", "LDH", "lactate dehydrogenase"]),
        // Inflammation
        ("CRP", vec!["C-reaktivní protein", "C-reactive protein"]),
        // Blood count
        ("Hemoglobin", vec!["Hb", "Hgb"]),
        ("Hematokrit", vec!["hematocrit", "Hct", "Htk"]),
        ("Erytrocyty", vec!["Ery", "RBC", "red blood cells"]),
        ("Leukocyty", vec!["Leu", "WBC", "white blood cells"]),
        ("Trombocyty", vec!["Trombo", "PLT", "platelets"]),
        ("MCV", vec!["střední objem erytrocytu"]),
        ("MCH", vec!["střední hmotnost hemoglobinu"]),
        ("MCHC", vec!["střední koncentrace hemoglobinu"]),
        // Thyroid
        ("TSH", vec!["tyreotropin", "thyrotropin"]),
        ("fT4", vec!["volný tyroxin", "free T4", "FT4"]),
        // Iron and vitamins
        ("Železo", vec!["iron", "Fe"]),
        ("Feritin", vec!["ferritin"]),
        ("Vitamin B12", vec!["kobalamin", "cobalamin"]),
        ("Vitamin D", vec!["25-OH vitamin D", "kalcidiol", "calcidiol"]),
        ("Kyselina listová", vec!["folát", "folic acid", "folate"]),
        // Markers
        ("PSA", vec!["prostatický specifický antigen"]),
    ]
}
