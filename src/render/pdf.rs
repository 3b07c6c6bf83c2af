//! # PDF export
//!
//! Proposals are laid out with Typst:
//!
//! - the template is an embedded string constant
//! - proposal data is injected as escaped Typst string literals, so user and
//!   model text can never be interpreted as markup
//! - every page carries a header band with the brand label and a footer band
//!   with the footer label and "Page i of N"
//! - output is raw PDF bytes (`Vec<u8>`)

use chrono::{Datelike, Utc};
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use crate::config::BrandConfig;
use crate::error::ExportError;
use crate::profile::{IndustrySelection, Proposal};

/// A rendered document ready for download.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

// ============================================================================
// Typst World Implementation
// ============================================================================

/// A minimal Typst world compiling a single in-memory document.
struct PdfWorld {
    main: Source,
    book: LazyHash<FontBook>,
    fonts: Vec<Font>,
    library: LazyHash<Library>,
}

impl PdfWorld {
    fn new(source: String) -> Self {
        let fonts = Self::load_fonts();
        let book = FontBook::from_fonts(&fonts);

        PdfWorld {
            main: Source::detached(source),
            book: LazyHash::new(book),
            fonts,
            library: LazyHash::new(Library::default()),
        }
    }

    fn load_fonts() -> Vec<Font> {
        typst_assets::fonts()
            .flat_map(|font_bytes| Font::iter(Bytes::new(font_bytes.to_vec())))
            .collect()
    }
}

impl World for PdfWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let now = Utc::now();
        Datetime::from_ymd(now.year(), now.month() as u8, now.day() as u8)
    }
}

// ============================================================================
// Template
// ============================================================================

const PROPOSAL_TEMPLATE: &str = r##"
#let header_label = {{HEADER_LABEL}}
#let footer_label = {{FOOTER_LABEL}}
#let title = {{TITLE}}
#let sub_industry = {{SUB_INDUSTRY}}
#let solutions = {{SOLUTIONS}}
#let summary = {{SUMMARY}}

#set page(
  paper: "a4",
  margin: (top: 22mm, bottom: 20mm, left: 15mm, right: 15mm),
  header-ascent: 14mm,
  footer-descent: 12mm,
  background: {
    place(top + left, rect(width: 100%, height: 12mm, fill: rgb("{{HEADER_COLOR}}")))
    place(bottom + left, rect(width: 100%, height: 10mm, fill: rgb("{{FOOTER_COLOR}}")))
  },
  header: text(size: 16pt, weight: "bold", fill: white, header_label),
  footer: context {
    set text(size: 10pt, fill: white)
    grid(
      columns: (1fr, auto),
      align(left, footer_label),
      align(right)[Page #counter(page).display() of #counter(page).final().first()],
    )
  },
)

#set text(size: 11pt)

#block(width: 100%, inset: (bottom: 8pt), stroke: (bottom: 0.5pt + gray))[
  #text(size: 22pt, weight: "bold", fill: rgb("{{FOOTER_COLOR}}"), title)
  #linebreak()
  #text(fill: gray)[Prepared for a leader in the #sub_industry sector]
]

#for solution in solutions [
  #block(width: 100%, fill: rgb("{{PANEL_COLOR}}"), inset: 12pt, radius: 4pt, breakable: false)[
    #text(size: 15pt, weight: "bold", solution.name)
    #list(..solution.outcomes)
  ]
]

#block(width: 100%, breakable: false, inset: (top: 12pt), stroke: (top: 0.5pt + gray))[
  #text(size: 15pt, weight: "bold")[Executive Summary]
  #parbreak()
  #summary
]
"##;

const HEADER_COLOR: &str = "#E42527";
const FOOTER_COLOR: &str = "#333333";
const PANEL_COLOR: &str = "#F5F5F5";

// ============================================================================
// Rendering
// ============================================================================

/// Render a proposal to PDF bytes.
pub fn render_proposal_pdf(
    proposal: &Proposal,
    selection: &IndustrySelection,
    brand: &BrandConfig,
) -> Result<Vec<u8>, ExportError> {
    let source = build_source(proposal, selection, brand);
    let world = PdfWorld::new(source);

    let warned = typst::compile(&world);
    let document = warned.output.map_err(|errors| {
        let msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        ExportError::Compile(msgs.join("; "))
    })?;

    typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        ExportError::Pdf(msgs.join("; "))
    })
}

/// Deterministic download name: every whitespace character in the
/// sub-industry becomes `_`.
pub fn export_file_name(brand: &BrandConfig, sub_industry: &str) -> String {
    let slug: String = sub_industry
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("{}_{}.pdf", brand.file_prefix, slug)
}

fn build_source(proposal: &Proposal, selection: &IndustrySelection, brand: &BrandConfig) -> String {
    PROPOSAL_TEMPLATE
        .replace("{{HEADER_LABEL}}", &typst_str(&brand.header_label))
        .replace("{{FOOTER_LABEL}}", &typst_str(&brand.footer_label))
        .replace("{{TITLE}}", &typst_str(&brand.title))
        .replace("{{SUB_INDUSTRY}}", &typst_str(&selection.sub_industry))
        .replace("{{SOLUTIONS}}", &solutions_array(proposal))
        .replace("{{SUMMARY}}", &typst_str(&proposal.summary))
        .replace("{{HEADER_COLOR}}", HEADER_COLOR)
        .replace("{{FOOTER_COLOR}}", FOOTER_COLOR)
        .replace("{{PANEL_COLOR}}", PANEL_COLOR)
}

/// `((name: "..", outcomes: ("..",),),)`. Trailing commas keep one-element
/// arrays from collapsing into parenthesized expressions.
fn solutions_array(proposal: &Proposal) -> String {
    let entries: String = proposal
        .solutions
        .iter()
        .map(|s| {
            let outcomes: String = s.outcomes.iter().map(|o| format!("{}, ", typst_str(o))).collect();
            format!(
                "(name: {}, outcomes: ({})), ",
                typst_str(&s.service_name),
                outcomes
            )
        })
        .collect();
    format!("({entries})")
}

/// Quote text as a Typst string literal.
fn typst_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
