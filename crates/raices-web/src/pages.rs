//! HTML views.
//!
//! Templates are compiled into the binary and rendered with minijinja;
//! `.html` templates are auto-escaped, so only the diagram markup is
//! marked safe.

use minijinja::{context, Environment};
use raices_domain::{Circle, Taxonomy};
use serde::Serialize;

/// Notice severity, matching the CSS class it renders with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    /// Action completed
    Success,
    /// Action failed
    Error,
    /// Something needs attention
    Warning,
}

/// A link shown after a notice
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoticeLink {
    /// Link text
    pub label: String,
    /// Target URL
    pub href: String,
}

/// One-shot message shown above a page's content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Severity
    pub kind: NoticeKind,
    /// Message
    pub text: String,
    /// Optional follow-up link
    pub link: Option<NoticeLink>,
}

impl Notice {
    fn new(kind: NoticeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            link: None,
        }
    }

    /// Success message
    pub fn success(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, text)
    }

    /// Error message
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::Error, text)
    }

    /// Warning message
    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::Warning, text)
    }

    /// Attach a link
    pub fn with_link(mut self, label: impl Into<String>, href: impl Into<String>) -> Self {
        self.link = Some(NoticeLink {
            label: label.into(),
            href: href.into(),
        });
        self
    }
}

#[derive(Debug, Serialize)]
struct CardView<'a> {
    label: &'a str,
    color: &'static str,
}

#[derive(Debug, Serialize)]
struct TallyView {
    card: String,
    count: usize,
    percent: usize,
    color: &'static str,
}

/// What the reading page shows
#[derive(Debug, Default)]
pub struct ReadingView<'a> {
    /// Drawn cards, empty before the draw
    pub cards: &'a [String],
    /// Diagram markup, empty when nothing connects to the reading
    pub diagram: String,
    /// Whether a report is ready for download
    pub download: bool,
}

/// Compiled page templates
pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    /// Compile the built-in templates
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("base.html", include_str!("../templates/base.html"))?;
        env.add_template("login.html", include_str!("../templates/login.html"))?;
        env.add_template("lectura.html", include_str!("../templates/lectura.html"))?;
        env.add_template("circulo.html", include_str!("../templates/circulo.html"))?;
        env.add_template("propuesta.html", include_str!("../templates/propuesta.html"))?;
        env.add_template("historial.html", include_str!("../templates/historial.html"))?;
        Ok(Self { env })
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String, minijinja::Error> {
        self.env.get_template(name)?.render(ctx)
    }

    /// Login form, with the username kept after a failed attempt
    pub fn login(&self, username: &str, notice: Option<&Notice>) -> Result<String, minijinja::Error> {
        self.render("login.html", context! { username, notice })
    }

    /// Reading page
    pub fn reading(
        &self,
        user: &str,
        taxonomy: &Taxonomy,
        view: &ReadingView<'_>,
        notice: Option<&Notice>,
    ) -> Result<String, minijinja::Error> {
        let cards: Vec<CardView<'_>> = view
            .cards
            .iter()
            .map(|label| CardView {
                label,
                color: taxonomy.categorize(label).color(),
            })
            .collect();

        self.render(
            "lectura.html",
            context! {
                user,
                active => "lectura",
                cards,
                diagram => view.diagram,
                download => view.download,
                notice,
            },
        )
    }

    /// Circle page with the entry table and the per-card tally
    pub fn circle(
        &self,
        user: &str,
        nodes: &[String],
        circle: &Circle,
        taxonomy: &Taxonomy,
        notice: Option<&Notice>,
    ) -> Result<String, minijinja::Error> {
        let tally = circle.tally();
        let max = tally.iter().map(|t| t.count).max().unwrap_or(1);
        let tally: Vec<TallyView> = tally
            .into_iter()
            .map(|t| TallyView {
                color: taxonomy.categorize(&t.card).color(),
                percent: t.count * 100 / max,
                card: t.card,
                count: t.count,
            })
            .collect();

        self.render(
            "circulo.html",
            context! {
                user,
                active => "circulo",
                nodes,
                entries => circle.entries(),
                tally,
                notice,
            },
        )
    }

    /// Proposal form
    pub fn proposal(&self, user: &str, nodes: &[String], notice: Option<&Notice>) -> Result<String, minijinja::Error> {
        self.render(
            "propuesta.html",
            context! { user, active => "propuesta", nodes, notice },
        )
    }

    /// History page; `report` is the last report's file name
    pub fn history(&self, user: &str, report: Option<&str>) -> Result<String, minijinja::Error> {
        self.render(
            "historial.html",
            context! { user, active => "historial", report },
        )
    }
}
