//! Report template rendering
//!
//! The template receives exactly `nombre`, `fecha`, `cartas`, `frases` and
//! `grafico`. Values are HTML-escaped except `grafico`, which the template
//! embeds as markup.

use crate::error::Result;
use chrono::NaiveDate;
use minijinja::{AutoEscape, Environment};
use serde::Serialize;
use std::path::Path;

const TEMPLATE_NAME: &str = "informe.html";
const DEFAULT_TEMPLATE: &str = include_str!("../templates/informe.html");

/// Affirmations printed in every report unless configured otherwise
pub const DEFAULT_AFFIRMATIONS: [&str; 3] = [
    "Libero lo que no es mío y recibo con gratitud lo que sí me pertenece.",
    "Tengo permiso para ser feliz.",
    "Te nombro, te honro, te doy un lugar en mi corazón.",
];

/// Values supplied to the report template
#[derive(Debug, Clone, Serialize)]
pub struct ReportContext {
    /// Display name of the reader
    pub nombre: String,

    /// Date formatted `dd/mm/YYYY`
    pub fecha: String,

    /// Drawn cards
    pub cartas: Vec<String>,

    /// Affirmations
    pub frases: Vec<String>,

    /// Embeddable diagram markup (may be empty)
    pub grafico: String,
}

impl ReportContext {
    /// Build a context, formatting `date` the way reports print it
    pub fn new(
        nombre: impl Into<String>,
        date: NaiveDate,
        cartas: Vec<String>,
        frases: Vec<String>,
        grafico: String,
    ) -> Self {
        Self {
            nombre: nombre.into(),
            fecha: format_date(date),
            cartas,
            frases,
            grafico,
        }
    }
}

/// Format a date as `dd/mm/YYYY`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Compiled report template
#[derive(Debug)]
pub struct ReportTemplate {
    env: Environment<'static>,
}

impl ReportTemplate {
    /// The built-in template
    pub fn builtin() -> Result<Self> {
        let mut env = Self::environment();
        env.add_template(TEMPLATE_NAME, DEFAULT_TEMPLATE)?;
        Ok(Self { env })
    }

    /// Compile a template from source text
    pub fn from_source(source: String) -> Result<Self> {
        let mut env = Self::environment();
        env.add_template_owned(TEMPLATE_NAME, source)?;
        Ok(Self { env })
    }

    /// Load a template file, or the built-in one when `path` is `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_source(std::fs::read_to_string(path)?),
            None => Self::builtin(),
        }
    }

    fn environment() -> Environment<'static> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env
    }

    /// Render the report document
    pub fn render(&self, context: &ReportContext) -> Result<String> {
        let html = self.env.get_template(TEMPLATE_NAME)?.render(context)?;
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn context() -> ReportContext {
        ReportContext::new(
            "Ana <María>",
            NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
            vec!["La Casa".to_string(), "El Río".to_string(), "La Semilla".to_string()],
            DEFAULT_AFFIRMATIONS.iter().map(|s| s.to_string()).collect(),
            "<svg id=\"mapa\"></svg>".to_string(),
        )
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()), "07/03/2024");
    }

    #[test]
    fn test_builtin_render() {
        let html = ReportTemplate::builtin().unwrap().render(&context()).unwrap();

        assert!(html.contains("07/03/2024"));
        assert!(html.contains("<li>El Río</li>"));
        assert!(html.contains("Tengo permiso para ser feliz."));
        // Name escaped, diagram embedded verbatim
        assert!(html.contains("Ana &lt;María&gt;"));
        assert!(html.contains("<svg id=\"mapa\"></svg>"));
    }

    #[test]
    fn test_no_diagram_block_when_empty() {
        let mut ctx = context();
        ctx.grafico = String::new();
        let html = ReportTemplate::builtin().unwrap().render(&ctx).unwrap();
        assert!(!html.contains("class=\"grafico\""));
    }

    #[test]
    fn test_custom_template_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{{{ nombre }}}}|{{{{ fecha }}}}|{{{{ cartas|join(',') }}}}").unwrap();

        let template = ReportTemplate::load(Some(file.path())).unwrap();
        let out = template.render(&context()).unwrap();
        assert_eq!(out, "Ana &lt;María&gt;|07/03/2024|La Casa,El Río,La Semilla");
    }

    #[test]
    fn test_broken_template_rejected() {
        let result = ReportTemplate::from_source("{% for %}".to_string());
        assert!(result.is_err());
    }
}
