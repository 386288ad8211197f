//! Analyst prompts for every supported response language.

use std::str::FromStr;

use strum::{Display, EnumString, IntoStaticStr};

/// Languages the analysis can be written in.
///
/// Parsed case-insensitively from the upload's `language` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Language {
    #[default]
    English,
    Hindi,
    Spanish,
    French,
    German,
    Portuguese,
    Italian,
    Chinese,
    Japanese,
    Korean,
    Arabic,
    Russian,
    Dutch,
    Swedish,
    Norwegian,
    Danish,
    Finnish,
    Turkish,
    Greek,
    Polish,
}

impl Language {
    /// Resolve a requested language, falling back to English for unknown names.
    pub fn resolve(requested: &str) -> Self {
        Self::from_str(requested.trim()).unwrap_or_default()
    }

    /// Language name as written inside the prompt.
    fn display_name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::German => "German",
            Language::Portuguese => "Portuguese",
            Language::Italian => "Italian",
            Language::Chinese => "Chinese",
            Language::Japanese => "Japanese",
            Language::Korean => "Korean",
            Language::Arabic => "Arabic",
            Language::Russian => "Russian",
            Language::Dutch => "Dutch",
            Language::Swedish => "Swedish",
            Language::Norwegian => "Norwegian",
            Language::Danish => "Danish",
            Language::Finnish => "Finnish",
            Language::Turkish => "Turkish",
            Language::Greek => "Greek",
            Language::Polish => "Polish",
        }
    }

    /// High/medium/low risk labels in this language.
    fn risk_scale(self) -> &'static str {
        match self {
            Language::English => "HIGH/MEDIUM/LOW",
            Language::Hindi => "उच्च/मध्यम/कम",
            Language::Spanish => "ALTO/MEDIO/BAJO",
            Language::French => "ÉLEVÉ/MOYEN/FAIBLE",
            Language::German => "HOCH/MITTEL/NIEDRIG",
            Language::Portuguese => "ALTO/MÉDIO/BAIXO",
            Language::Italian => "ALTO/MEDIO/BASSO",
            Language::Chinese | Language::Japanese => "高/中/低",
            Language::Korean => "높음/보통/낮음",
            Language::Arabic => "عالي/متوسط/منخفض",
            Language::Russian => "ВЫСОКИЙ/СРЕДНИЙ/НИЗКИЙ",
            Language::Dutch => "HOOG/GEMIDDELD/LAAG",
            Language::Swedish => "HÖG/MEDEL/LÅG",
            Language::Norwegian => "HØY/MIDDELS/LAV",
            Language::Danish => "HØJ/MELLEM/LAV",
            Language::Finnish => "KORKEA/KESKITASO/MATALA",
            Language::Turkish => "YÜKSEK/ORTA/DÜŞÜK",
            Language::Greek => "ΥΨΗΛΟΣ/ΜΕΣΟΣ/ΧΑΜΗΛΟΣ",
            Language::Polish => "WYSOKIE/ŚREDNIE/NISKIE",
        }
    }

    /// The analyst instructions, ending just before the document text.
    pub fn prompt(self) -> String {
        const PREAMBLE: &str = "You are a highly experienced financial analyst with expertise in risk assessment, portfolio management, and financial document analysis.";

        if self == Language::English {
            return format!(
                r#"{PREAMBLE} Analyze this financial document text thoroughly and provide a comprehensive analysis in English.

Please provide a detailed analysis covering:
1. Overall financial health assessment
2. Risk factors identification and analysis
3. Portfolio diversification evaluation
4. Key performance indicators analysis
5. Market trends and implications
6. Specific recommendations for improvement
7. Potential opportunities and threats
8. Compliance and regulatory considerations

Return your analysis in JSON format only:
{{
  "response": "Provide a comprehensive 400-600 word analysis covering all aspects mentioned above. Include specific numbers, percentages, and concrete observations from the document. Explain risk factors in detail, diversification strengths/weaknesses, performance trends, and actionable recommendations. Make it professional but accessible.",
  "risk": "{risk} (based on comprehensive risk assessment)",
  "percentage": "0-100 (overall risk percentage considering all factors)",
  "diversification_score": "0-100 (portfolio diversification quality score)"
}}

Document text to analyze:"#,
                risk = self.risk_scale(),
            );
        }

        format!(
            r#"{PREAMBLE} Analyze this financial document text thoroughly and provide a comprehensive analysis in {name}.

Please provide a detailed analysis covering all the key aspects of financial health, risk assessment, diversification, performance indicators, market trends, recommendations, opportunities, threats, and compliance considerations.

Return your analysis in JSON format only with responses in {name}:
{{
  "response": "Provide a comprehensive 400-600 word analysis in {name} covering all financial aspects. Include specific numbers, percentages, and concrete observations from the document.",
  "risk": "{risk} (based on comprehensive risk assessment)",
  "percentage": "0-100 (overall risk percentage considering all factors)",
  "diversification_score": "0-100 (portfolio diversification quality score)"
}}

Document text to analyze:"#,
            name = self.display_name(),
            risk = self.risk_scale(),
        )
    }
}

/// Full prompt sent to the backend: instructions, a blank line, then the document.
pub fn build_prompt(language: Language, document_text: &str) -> String {
    format!("{}\n\n{}", language.prompt(), document_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_case_insensitive() {
        assert_eq!(Language::resolve("Spanish"), Language::Spanish);
        assert_eq!(Language::resolve("GERMAN"), Language::German);
        assert_eq!(Language::resolve(" korean "), Language::Korean);
    }

    #[test]
    fn test_unknown_language_falls_back_to_english() {
        assert_eq!(Language::resolve("klingon"), Language::English);
        assert_eq!(Language::resolve(""), Language::English);
    }

    #[test]
    fn test_language_names_are_lowercase() {
        assert_eq!(Language::Portuguese.to_string(), "portuguese");
        let name: &'static str = Language::Arabic.into();
        assert_eq!(name, "arabic");
    }

    #[test]
    fn test_english_prompt_lists_sections() {
        let prompt = Language::English.prompt();
        assert!(prompt.contains("8. Compliance and regulatory considerations"));
        assert!(prompt.contains("\"risk\": \"HIGH/MEDIUM/LOW"));
        assert!(prompt.ends_with("Document text to analyze:"));
    }

    #[test]
    fn test_localized_prompt() {
        let prompt = Language::French.prompt();
        assert!(prompt.contains("comprehensive analysis in French."));
        assert!(prompt.contains("\"risk\": \"ÉLEVÉ/MOYEN/FAIBLE"));
        assert!(!prompt.contains("1. Overall financial health"));
    }

    #[test]
    fn test_build_prompt_appends_document() {
        let prompt = build_prompt(Language::English, "Total Assets $1,000");
        assert!(prompt.ends_with("Document text to analyze:\n\nTotal Assets $1,000"));
    }
}
