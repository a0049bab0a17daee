//! Raíces del Ser Report Assembly
//!
//! Turns a reading into an exportable document:
//!
//! - [`FlowDiagram`] lays out the edges touching the reading as SVG
//! - [`ReportTemplate`] renders the document from its five fields
//! - [`PdfRenderer`] converts the document into the PDF artifact
//! - [`share_link`] builds the outbound message link shown after export

#![warn(missing_docs)]

pub mod diagram;
pub mod error;
pub mod pdf;
pub mod share;
pub mod template;

pub use diagram::{DiagramLink, DiagramNode, FlowDiagram};
pub use error::{ReportError, Result};
pub use pdf::{CommandPdfRenderer, PdfCommandConfig, PdfRenderer};
pub use share::{share_link, SHARE_MESSAGE};
pub use template::{format_date, ReportContext, ReportTemplate, DEFAULT_AFFIRMATIONS};

use chrono::NaiveDate;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// What a report is built from
#[derive(Debug, Clone)]
pub struct ReportRequest<'a> {
    /// Display name of the reader
    pub name: &'a str,

    /// Report date
    pub date: NaiveDate,

    /// Drawn cards
    pub cards: &'a [String],

    /// Diagram markup, empty when there is no diagram
    pub diagram: String,
}

/// Template plus renderer plus the affirmations every report carries
pub struct ReportAssembler {
    template: ReportTemplate,
    renderer: Arc<dyn PdfRenderer>,
    affirmations: Vec<String>,
}

impl ReportAssembler {
    /// Create an assembler
    pub fn new(
        template: ReportTemplate,
        renderer: Arc<dyn PdfRenderer>,
        affirmations: Vec<String>,
    ) -> Self {
        Self {
            template,
            renderer,
            affirmations,
        }
    }

    /// Render the report document
    pub fn html(&self, request: &ReportRequest<'_>) -> Result<String> {
        if request.cards.is_empty() {
            return Err(ReportError::Empty("no cards drawn".to_string()));
        }

        let context = ReportContext::new(
            request.name,
            request.date,
            request.cards.to_vec(),
            self.affirmations.clone(),
            request.diagram.clone(),
        );
        self.template.render(&context)
    }

    /// Render the document and write the PDF to `output`
    pub async fn export(&self, request: &ReportRequest<'_>, output: &Path) -> Result<()> {
        let html = self.html(request)?;
        self.renderer.render(&html, output).await?;
        info!(output = %output.display(), cards = request.cards.len(), "Exported report");
        Ok(())
    }
}
