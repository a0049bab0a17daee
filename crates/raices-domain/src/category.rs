//! Category module - semantic buckets derived from node labels
//!
//! Categorization is first-match-wins:
//! Major Symbols → Beyond-Presences → Healing Phrases → Symptoms/Emotions,
//! falling back to Root Cards. The first two steps are exact membership,
//! the next two are substring matches.

use serde::{Deserialize, Serialize};

/// Semantic category of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Major arcana and other fixed symbols
    MajorSymbol,

    /// The deck proper; readings are drawn from here
    RootCard,

    /// Symptoms and emotions
    SymptomEmotion,

    /// Healing phrases and affirmations
    HealingPhrase,

    /// Presences from beyond
    BeyondPresence,
}

impl Category {
    /// All categories, in display order
    pub const ALL: [Category; 5] = [
        Category::MajorSymbol,
        Category::RootCard,
        Category::SymptomEmotion,
        Category::HealingPhrase,
        Category::BeyondPresence,
    ];

    /// Get the category name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::MajorSymbol => "major_symbol",
            Category::RootCard => "root_card",
            Category::SymptomEmotion => "symptom_emotion",
            Category::HealingPhrase => "healing_phrase",
            Category::BeyondPresence => "beyond_presence",
        }
    }

    /// Display label shown to users
    pub fn label(&self) -> &'static str {
        match self {
            Category::MajorSymbol => "Arcanos Mayores",
            Category::RootCard => "Cartas Raíces del Ser",
            Category::SymptomEmotion => "Síntomas / Emociones",
            Category::HealingPhrase => "Frases Sanadoras",
            Category::BeyondPresence => "Presencias del Más Allá",
        }
    }

    /// Diagram colour
    pub fn color(&self) -> &'static str {
        match self {
            Category::MajorSymbol => "#4E79A7",
            Category::RootCard => "#F28E2B",
            Category::SymptomEmotion => "#E15759",
            Category::HealingPhrase => "#76B7B2",
            Category::BeyondPresence => "#59A14F",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The label and keyword lists driving categorization
///
/// Loaded from TOML when the taxonomy needs to evolve; any list left out
/// of the file keeps its built-in value. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Taxonomy {
    /// Exact labels of the Major Symbols
    pub major_symbols: Vec<String>,

    /// Exact labels of the Beyond-Presences
    pub beyond_presences: Vec<String>,

    /// Substrings marking any label as a healing phrase
    pub healing_markers: Vec<String>,

    /// Known affirmation fragments
    pub healing_phrases: Vec<String>,

    /// Symptom and emotion keyword fragments
    pub symptom_keywords: Vec<String>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self {
            major_symbols: owned(&[
                "El Mundo",
                "El Emperador",
                "La Justicia",
                "El Juicio",
                "El Colgado",
                "La Torre",
                "La Muerte",
                "Templanza",
                "La Fuerza",
                "El Carro",
                "La Estrella",
                "La Luna",
                "El Sol",
                "La Rueda de la Fortuna",
                "El Loco",
                "Cinco de Espadas",
                "Tres de Copas",
                "Cinco de Bastos",
            ]),
            beyond_presences: owned(&[
                "El Ancestro No Nombrado",
                "El Ángel del Linaje",
                "El Espíritu del Lugar",
                "La Gran Alma",
                "El Alma que Espera",
                "El Que Se Fue Temprano",
                "El Guardián del Umbral",
                "El Portador del Secreto",
                "El Renacido",
            ]),
            healing_markers: owned(&["Frase"]),
            healing_phrases: owned(&[
                "Libero lo que no es mío",
                "Tengo permiso",
                "Te nombro",
                "Soy uno con todos",
                "Permiso para",
                "Mi amor nutre",
                "Tu deseo no murió",
                "Hablo lo que callé",
            ]),
            symptom_keywords: owned(&[
                "Acné",
                "Ansiedad",
                "Dolor",
                "Miedo",
                "Agotamiento",
                "Insomnio",
                "Vacío",
                "Conflicto",
                "Carga",
                "Parálisis",
                "Duelo",
            ]),
        }
    }
}

impl Taxonomy {
    /// Map a label to exactly one category
    pub fn categorize(&self, label: &str) -> Category {
        if self.major_symbols.iter().any(|s| s == label) {
            return Category::MajorSymbol;
        }
        if self.beyond_presences.iter().any(|s| s == label) {
            return Category::BeyondPresence;
        }
        if self.is_healing_phrase(label) {
            return Category::HealingPhrase;
        }
        if self.symptom_keywords.iter().any(|k| label.contains(k.as_str())) {
            return Category::SymptomEmotion;
        }
        Category::RootCard
    }

    fn is_healing_phrase(&self, label: &str) -> bool {
        // An empty marker would match every label
        self.healing_markers
            .iter()
            .any(|m| !m.is_empty() && label.contains(m.as_str()))
            || self.healing_phrases.iter().any(|p| label.contains(p.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_examples() {
        let taxonomy = Taxonomy::default();
        assert_eq!(taxonomy.categorize("El Mundo"), Category::MajorSymbol);
        assert_eq!(taxonomy.categorize("Ansiedad Crónica"), Category::SymptomEmotion);
        assert_eq!(taxonomy.categorize("Carta Desconocida"), Category::RootCard);
    }

    #[test]
    fn test_each_rule() {
        let taxonomy = Taxonomy::default();
        assert_eq!(taxonomy.categorize("El Renacido"), Category::BeyondPresence);
        assert_eq!(taxonomy.categorize("Frase del Perdón"), Category::HealingPhrase);
        assert_eq!(
            taxonomy.categorize("Tengo permiso para ser feliz"),
            Category::HealingPhrase
        );
        assert_eq!(taxonomy.categorize("Dolor de Espalda"), Category::SymptomEmotion);
        assert_eq!(taxonomy.categorize("La Casa de la Abuela"), Category::RootCard);
    }

    #[test]
    fn test_exact_lists_precede_substrings() {
        let mut taxonomy = Taxonomy::default();
        taxonomy.major_symbols.push("Miedo Ancestral".to_string());

        // Matches a symptom keyword too, but exact membership wins
        assert_eq!(taxonomy.categorize("Miedo Ancestral"), Category::MajorSymbol);
    }

    #[test]
    fn test_healing_precedes_symptom() {
        let taxonomy = Taxonomy::default();
        // "Frase" and "Miedo" both present
        assert_eq!(taxonomy.categorize("Frase para el Miedo"), Category::HealingPhrase);
    }

    #[test]
    fn test_exact_membership_is_exact() {
        let taxonomy = Taxonomy::default();
        assert_eq!(taxonomy.categorize("El Mundo Interior"), Category::RootCard);
        assert_eq!(taxonomy.categorize("el mundo"), Category::RootCard);
    }

    #[test]
    fn test_partial_lists_keep_defaults() {
        let taxonomy: Taxonomy = from_json(r#"{"major_symbols": ["La Semilla"]}"#);
        assert_eq!(taxonomy.categorize("La Semilla"), Category::MajorSymbol);
        assert_eq!(taxonomy.categorize("El Mundo"), Category::RootCard);
        assert_eq!(taxonomy.categorize("Insomnio"), Category::SymptomEmotion);
    }

    #[test]
    fn test_empty_marker_matches_nothing() {
        let taxonomy = Taxonomy {
            healing_markers: vec![String::new()],
            ..Taxonomy::default()
        };
        assert_eq!(taxonomy.categorize("Carta Desconocida"), Category::RootCard);
    }

    #[test]
    fn test_every_healing_marker_applies() {
        let taxonomy: Taxonomy = from_json(r#"{"healing_markers": ["Frase", "Sanación"]}"#);
        assert_eq!(taxonomy.categorize("Sanación Profunda"), Category::HealingPhrase);
        assert_eq!(taxonomy.categorize("Frase del Perdón"), Category::HealingPhrase);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = serde_json::from_str::<Taxonomy>(r#"{"healing_marker": "Sanación"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_labels_and_colors_distinct() {
        let labels: std::collections::HashSet<_> =
            Category::ALL.iter().map(|c| c.label()).collect();
        let colors: std::collections::HashSet<_> =
            Category::ALL.iter().map(|c| c.color()).collect();
        assert_eq!(labels.len(), 5);
        assert_eq!(colors.len(), 5);
    }

    fn from_json(json: &str) -> Taxonomy {
        serde_json::from_str(json).unwrap()
    }
}
