use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

type Dict = LinkedHashMap<String, Value>;

#[derive(Error, Debug)]
pub enum NotebookError {
    #[error("could not access notebook file")]
    Io(#[from] std::io::Error),
    #[error("invalid notebook json")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Notebook {
    pub metadata: NotebookMeta,
    pub nbformat: i64,
    pub nbformat_minor: i64,
    pub cells: Vec<Cell>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NotebookMeta {
    pub language: String,
    pub celltoolbar: String,
    pub livereveal: LiveReveal,
    #[serde(flatten)]
    pub optional: Dict,
}

impl Default for NotebookMeta {
    fn default() -> Self {
        NotebookMeta {
            language: "python".to_string(),
            celltoolbar: "Slideshow".to_string(),
            livereveal: LiveReveal::default(),
            optional: Dict::new(),
        }
    }
}

/// Slideshow settings read by the RISE extension.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LiveReveal {
    pub transition: String,
    pub scroll: bool,
    pub controls: bool,
    #[serde(rename = "slideNumber")]
    pub slide_number: bool,
    pub help: bool,
}

impl Default for LiveReveal {
    fn default() -> Self {
        LiveReveal {
            transition: "none".to_string(),
            scroll: true,
            controls: true,
            slide_number: true,
            help: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideType {
    /// Starts a new slide.
    #[serde(rename = "slide")]
    Slide,
    /// A progressive reveal step within the current slide.
    #[serde(rename = "fragment")]
    Fragment,
    #[serde(rename = "-")]
    Continuation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Markdown,
    Code,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Slideshow {
    pub slide_type: SlideType,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CellMeta {
    pub slideshow: Slideshow,
    #[serde(flatten)]
    pub additional: Dict,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CellCommon {
    pub metadata: CellMeta,
    /// Fragments are joined without a separator to form the cell text.
    pub source: Vec<String>,
}

type CellOutput = LinkedHashMap<String, Value>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "cell_type")]
pub enum Cell {
    #[serde(rename = "markdown")]
    Markdown {
        #[serde(flatten)]
        common: CellCommon,
    },
    #[serde(rename = "code")]
    Code {
        #[serde(flatten)]
        common: CellCommon,

        execution_count: Option<i64>,

        outputs: Vec<CellOutput>,
    },
}

impl Cell {
    pub fn new(kind: CellKind, slide_type: SlideType) -> Self {
        let common = CellCommon {
            metadata: CellMeta {
                slideshow: Slideshow { slide_type },
                additional: Dict::new(),
            },
            source: vec![],
        };
        match kind {
            CellKind::Markdown => Cell::Markdown { common },
            CellKind::Code => Cell::code_from(common),
        }
    }

    fn code_from(common: CellCommon) -> Self {
        Cell::Code {
            common,
            execution_count: None,
            outputs: vec![],
        }
    }

    pub fn kind(&self) -> CellKind {
        match self {
            Cell::Markdown { .. } => CellKind::Markdown,
            Cell::Code { .. } => CellKind::Code,
        }
    }

    pub fn common(&self) -> &CellCommon {
        match self {
            Cell::Markdown { common } | Cell::Code { common, .. } => common,
        }
    }

    pub fn common_mut(&mut self) -> &mut CellCommon {
        match self {
            Cell::Markdown { common } | Cell::Code { common, .. } => common,
        }
    }

    pub fn source(&self) -> &[String] {
        &self.common().source
    }

    pub fn source_mut(&mut self) -> &mut Vec<String> {
        &mut self.common_mut().source
    }

    /// The rendered cell text.
    pub fn text(&self) -> String {
        self.source().concat()
    }

    pub fn slide_type(&self) -> SlideType {
        self.common().metadata.slideshow.slide_type
    }

    pub fn set_slide_type(&mut self, slide_type: SlideType) {
        self.common_mut().metadata.slideshow.slide_type = slide_type;
    }

    /// Turn the cell into a code cell, keeping its metadata and source.
    pub fn into_code(self) -> Self {
        match self {
            Cell::Markdown { common } => Cell::code_from(common),
            code => code,
        }
    }
}

impl Notebook {
    pub fn new(metadata: NotebookMeta, cells: Vec<Cell>) -> Self {
        Notebook {
            metadata,
            nbformat: 4,
            nbformat_minor: 4,
            cells,
        }
    }

    /// Write the notebook the way Jupyter does: one-space indentation and a trailing newline.
    pub fn write<W: Write>(&self, writer: W) -> Result<(), NotebookError> {
        let mut writer = BufWriter::new(writer);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
        let mut ser = serde_json::Serializer::with_formatter(&mut writer, formatter);
        self.serialize(&mut ser)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), NotebookError> {
        self.write(File::create(path)?)
    }

    pub fn to_json(&self) -> Result<String, NotebookError> {
        let mut buf = Vec::new();
        self.write(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self, NotebookError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn markdown_cell_layout() {
        let mut cell = Cell::new(CellKind::Markdown, SlideType::Slide);
        cell.source_mut().push("## Foo\n".into());

        let value = serde_json::to_value(&cell).unwrap();
        assert_eq!(
            value,
            json!({
                "cell_type": "markdown",
                "metadata": {"slideshow": {"slide_type": "slide"}},
                "source": ["## Foo\n"]
            })
        );
    }

    #[test]
    fn code_cell_layout() {
        let cell = Cell::new(CellKind::Code, SlideType::Continuation);

        let value = serde_json::to_value(&cell).unwrap();
        assert_eq!(
            value,
            json!({
                "cell_type": "code",
                "metadata": {"slideshow": {"slide_type": "-"}},
                "source": [],
                "execution_count": null,
                "outputs": []
            })
        );
    }

    #[test]
    fn into_code_keeps_metadata() {
        let cell = Cell::new(CellKind::Markdown, SlideType::Fragment).into_code();
        assert_eq!(cell.kind(), CellKind::Code);
        assert_eq!(cell.slide_type(), SlideType::Fragment);
    }

    #[test]
    fn notebook_metadata_defaults() {
        let nb = Notebook::new(NotebookMeta::default(), vec![]);
        let value = serde_json::to_value(&nb).unwrap();

        assert_eq!(value["nbformat"], json!(4));
        assert_eq!(value["metadata"]["language"], json!("python"));
        assert_eq!(value["metadata"]["celltoolbar"], json!("Slideshow"));
        assert_eq!(
            value["metadata"]["livereveal"],
            json!({
                "transition": "none",
                "scroll": true,
                "controls": true,
                "slideNumber": true,
                "help": true
            })
        );
    }

    #[test]
    fn written_notebook_reads_back() {
        let mut cell = Cell::new(CellKind::Code, SlideType::Slide);
        cell.source_mut().push("print(1)\n".into());
        let nb = Notebook::new(NotebookMeta::default(), vec![cell]);

        let text = nb.to_json().unwrap();
        assert!(text.starts_with("{\n \""));
        assert!(text.ends_with("}\n"));

        let back: Notebook = serde_json::from_str(&text).unwrap();
        assert_eq!(back, nb);
    }
}
