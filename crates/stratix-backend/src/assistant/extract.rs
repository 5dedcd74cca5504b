//! Entity names pulled out of free-form Spanish questions.

use regex::Regex;

/// Extracts initiative and area names from user text.
///
/// Patterns are tried in order on the lower-cased text; the first match
/// wins. The captured name is cleaned of a leading restatement of the
/// entity noun and title-cased.
#[derive(Debug, Clone)]
pub struct NameExtractor {
    initiative: Vec<Regex>,
    initiative_prefix: Regex,
    area: Vec<Regex>,
    area_prefix: Regex,
}

impl NameExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            initiative: compile(&[
                r"iniciativa\s+(?:de\s+)?([^?]+)",
                r"(?:progreso|estado)\s+de\s+(?:la\s+)?([^?]+)",
                r"(?:cómo\s+va)\s+(?:la\s+)?([^?]+)",
            ])?,
            initiative_prefix: Regex::new(r"^(?:la\s+)?iniciativa\s+(?:de\s+)?")?,
            area: compile(&[
                r"área\s+(?:de\s+)?([^?]+)",
                r"división\s+(?:de\s+)?([^?]+)",
                r"departamento\s+(?:de\s+)?([^?]+)",
                r"(?:kpis?\s+del?\s+área\s+(?:de\s+)?)([^?]+)",
            ])?,
            area_prefix: Regex::new(
                r"^(?:la\s+|el\s+)?(?:área|división|departamento)\s+(?:de\s+)?",
            )?,
        })
    }

    /// `"¿Cómo va la iniciativa de nuevo CRM?"` yields `Some("Nuevo Crm")`.
    pub fn initiative_name(&self, text: &str) -> Option<String> {
        extract(&self.initiative, &self.initiative_prefix, text)
    }

    /// `"KPIs del área de ventas"` yields `Some("Ventas")`.
    pub fn area_name(&self, text: &str) -> Option<String> {
        extract(&self.area, &self.area_prefix, text)
    }
}

fn compile(patterns: &[&str]) -> Result<Vec<Regex>, regex::Error> {
    patterns.iter().map(|p| Regex::new(p)).collect()
}

fn extract(patterns: &[Regex], prefix: &Regex, text: &str) -> Option<String> {
    let lowered = text.trim().to_lowercase();

    let captured = patterns
        .iter()
        .find_map(|re| re.captures(&lowered))
        .and_then(|caps| caps.get(1))?
        .as_str()
        .trim();

    let cleaned = prefix.replace(captured, "");
    let name = title_case(cleaned.trim());
    (!name.is_empty()).then_some(name)
}

/// Upper-cases the first letter of every word and lower-cases the rest.
/// A word starts at any letter not preceded by another letter.
pub(crate) fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> NameExtractor {
        NameExtractor::new().unwrap()
    }

    #[test]
    fn test_initiative_patterns() {
        let ex = extractor();
        assert_eq!(
            ex.initiative_name("¿Cuál es el progreso de la iniciativa de Nuevo CRM?")
                .as_deref(),
            Some("Nuevo Crm")
        );
        assert_eq!(
            ex.initiative_name("estado de la Transformación Digital").as_deref(),
            Some("Transformación Digital")
        );
        assert_eq!(
            ex.initiative_name("¿Cómo va la expansión regional?").as_deref(),
            Some("Expansión Regional")
        );
    }

    #[test]
    fn test_area_patterns() {
        let ex = extractor();
        assert_eq!(
            ex.area_name("Muéstrame los KPIs del área de ventas").as_deref(),
            Some("Ventas")
        );
        assert_eq!(
            ex.area_name("resultados de la división comercial").as_deref(),
            Some("Comercial")
        );
        assert_eq!(
            ex.area_name("departamento de recursos humanos?").as_deref(),
            Some("Recursos Humanos")
        );
    }

    #[test]
    fn test_no_match_yields_none() {
        let ex = extractor();
        assert_eq!(ex.initiative_name("hola"), None);
        assert_eq!(ex.area_name(""), None);
        assert_eq!(ex.initiative_name("iniciativa ?"), None);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("nuevo crm 2.0"), "Nuevo Crm 2.0");
        assert_eq!(title_case("o'neil-smith"), "O'Neil-Smith");
        assert_eq!(title_case("ÁREA norte"), "Área Norte");
    }
}
