use beamer_parser::tree::Node;
use pretty_assertions::assert_eq;

use crate::converter::handlers;
use crate::converter::{clear_newline, ConvertError, Converter, Flow, HandlerSet, Walker};
use crate::notebook::{Cell, CellKind, SlideType};

fn parse(doc: &str) -> Vec<Cell> {
    Converter::new().parse(doc).expect("conversion failed")
}

fn sources(cells: &[Cell]) -> Vec<Vec<String>> {
    cells.iter().map(|c| c.source().to_vec()).collect()
}

fn kinds(cells: &[Cell]) -> Vec<(CellKind, SlideType)> {
    cells.iter().map(|c| (c.kind(), c.slide_type())).collect()
}

#[test]
fn clear_newline_rules() {
    assert_eq!(clear_newline("\n"), "");
    assert_eq!(clear_newline("\nHello world"), "Hello world");
    assert_eq!(clear_newline("\nHello world\n  "), "Hello world\n");
    assert_eq!(clear_newline(" item 1\n    "), " item 1\n");
    assert_eq!(clear_newline(" hello "), " hello");
}

#[test]
fn frame_with_title() {
    let cells = parse("\\begin{document}\\begin{frame}\\frametitle{Foo}\nHello world\\end{frame}\\end{document}");

    assert_eq!(kinds(&cells), vec![(CellKind::Markdown, SlideType::Slide)]);
    assert_eq!(cells[0].source(), ["## Foo\n", "Hello world"]);
}

#[test]
fn listing_with_output_makes_multiple_cells() {
    let doc = r"
\begin{document}
\begin{lstlisting}
In []: 1
Out[]: 1
In []: 1+1
Out[]: 2
\end{lstlisting}
\end{document}
";
    let cells = parse(doc);

    assert_eq!(cells.len(), 3);
    assert_eq!(cells[0].source(), ["1\n"]);
    assert_eq!(cells[1].source(), ["1+1\n"]);
    assert!(cells[2].source().is_empty());
    for cell in &cells {
        assert_eq!(cell.kind(), CellKind::Code);
        assert_eq!(cell.slide_type(), SlideType::Continuation);
    }
}

#[test]
fn single_output_marker_splits_in_two() {
    let doc = r"
\begin{document}
\begin{frame}
x
\begin{lstlisting}
In []: a = 1
Out[]: 1
In []: a + 1
\end{lstlisting}
\end{frame}
\end{document}
";
    let cells = parse(doc);

    assert_eq!(
        kinds(&cells),
        vec![
            (CellKind::Markdown, SlideType::Slide),
            (CellKind::Code, SlideType::Continuation),
            (CellKind::Code, SlideType::Continuation),
        ]
    );
    assert_eq!(cells[1].source(), ["a = 1\n"]);
    assert_eq!(cells[2].source(), ["a + 1\n"]);
}

#[test]
fn continuation_and_numbered_prompts() {
    let doc = r"
\begin{document}
\begin{lstlisting}
In [3]: for i in range(2):
   ...:     print(i)
\end{lstlisting}
\end{document}
";
    let cells = parse(doc);
    assert_eq!(
        cells[0].source(),
        ["for i in range(2):\n", "    print(i)\n"]
    );
}

#[test]
fn multiple_listings() {
    let doc = r"
\begin{document}
\begin{frame}
\begin{lstlisting}
In []: 1
\end{lstlisting}
\begin{itemize}
\item blah
\end{itemize}
\begin{verbatim}
In []: 2
print(2)
>>> print('hello')
\end{verbatim}
\end{frame}
\end{document}
";
    let cells = parse(doc);

    assert_eq!(
        kinds(&cells),
        vec![
            (CellKind::Code, SlideType::Slide),
            (CellKind::Markdown, SlideType::Continuation),
            (CellKind::Code, SlideType::Continuation),
        ]
    );
    assert_eq!(
        sources(&cells),
        vec![
            vec!["1\n".to_string()],
            vec!["* blah\n".to_string()],
            vec![
                "2\n".to_string(),
                "print(2)\n".to_string(),
                ">>> print('hello')\n".to_string()
            ],
        ]
    );
}

#[test]
fn listings_inside_itemize() {
    let doc = r"
\begin{document}
\begin{frame}
\begin{itemize}
\item item1
\begin{lstlisting}
In []: 1
\end{lstlisting}
\item item2
\begin{verbatim}
print(2)
\end{verbatim}
\end{itemize}
\end{frame}
\end{document}
";
    let cells = parse(doc);

    assert_eq!(
        kinds(&cells),
        vec![
            (CellKind::Markdown, SlideType::Slide),
            (CellKind::Code, SlideType::Continuation),
            (CellKind::Markdown, SlideType::Continuation),
            (CellKind::Code, SlideType::Continuation),
        ]
    );
    assert_eq!(cells[0].source(), ["* item1\n"]);
    assert_eq!(cells[1].source(), ["1\n"]);
    assert_eq!(cells[2].source(), ["* item2\n"]);
    assert_eq!(cells[3].source(), ["print(2)\n"]);
}

#[test]
fn listing_without_known_body_is_fatal() {
    let doc = "\\begin{document}\\begin{frame}x \\begin{verbatim}\ncode\n\\end{verbatim}\\end{frame}\\end{document}";
    let err = Converter::new().parse(doc).unwrap_err();

    assert!(matches!(
        err,
        ConvertError::MissingListing {
            index: 0,
            available: 0
        }
    ));
}

const TITLE_DOC: &str = r"
\documentclass[14pt, compress]{beamer}

\begin{document}
\title{foo}
\author{blah}
\date{date}
\institute{Institute}

\begin{frame}
\titlepage
\end{frame}

\begin{frame}
\frametitle{Foo}
Hello world
\end{frame}
\end{document}
";

#[test]
fn titlepage_is_created() {
    let cells = parse(TITLE_DOC);

    assert_eq!(cells.len(), 2);
    assert_eq!(
        cells[0].source(),
        [
            "# foo\n",
            "\n",
            "**blah**\n",
            "\n",
            "**Institute**\n",
            "\n",
            "**date**\n",
            "\n"
        ]
    );
    assert_eq!(cells[1].source(), ["## Foo\n", "Hello world\n"]);
}

#[test]
fn titlepage_uses_fields_declared_before_and_after() {
    let doc = r"
\documentclass{beamer}
\title{foo}
\author{blah}
\begin{document}
\begin{frame}
\titlepage
\end{frame}
\date{later}
\end{document}
";
    let cells = parse(doc);

    assert_eq!(cells.len(), 1);
    let src = cells[0].source();
    assert_eq!(src[0], "# foo\n");
    assert_eq!(src[2], "**blah**\n");
    assert_eq!(src[4], "**Institute**\n");
    assert_eq!(src[6], "**later**\n");
}

#[test]
fn itemize_and_enumerate() {
    let doc = r"
\begin{document}
\begin{frame}
\frametitle{Title}
   \begin{itemize}
    \item item 1
    \item item 2
   \end{itemize}
   \begin{enumerate}
    \item aa
    \item bb
   \end{enumerate}
hello
\end{frame}
\end{document}
";
    let cells = parse(doc);

    assert_eq!(cells.len(), 1);
    assert_eq!(
        cells[0].source(),
        [
            "## Title\n",
            "\n",
            "* item 1\n\n",
            "* item 2\n\n",
            "1. aa\n\n",
            "1. bb\nhello\n"
        ]
    );
}

#[test]
fn item_inside_group_sees_list_parent() {
    let cells = parse("\\begin{document}\\begin{frame}\\begin{itemize} {\\item a}\\end{itemize}\\end{frame}\\end{document}");
    assert_eq!(cells[0].source(), ["* a\n"]);
}

#[test]
fn item_outside_list_has_no_marker() {
    let cells = parse("\\begin{document}\\begin{frame}\\item x\\end{frame}\\end{document}");
    assert_eq!(cells[0].source(), [" x"]);
}

#[test]
fn images_and_urls() {
    let doc = r"
\begin{document}
\begin{frame}
\frametitle{Title}
\begin{figure}
\pgfimage[height=1cm,width=1cm]{images/img1.png}
\end{figure}
\includegraphics[height=1cm,width=1cm]{images/img2.jpg}
\url{www.python.org}
\end{frame}
\end{document}
";
    let cells = parse(doc);

    assert_eq!(
        cells[0].source(),
        [
            "## Title\n",
            "",
            "<img src=\"images/img1.png\"/>\n",
            "<img src=\"images/img2.jpg\"/>\n",
            "<www.python.org> "
        ]
    );
}

#[test]
fn movies() {
    let doc = r"
\begin{document}
\begin{frame}
\movie[width=9cm, height=5cm]{}{movies/movie.mp4}
\media{poster.png}{movies/movie.mp4}
\end{frame}
\end{document}
";
    let cells = parse(doc);
    let video = [
        "<div align=\"center\">\n",
        "<video loop controls src=\"movies/movie.mp4\"/>\n",
        "</div>\n",
    ];

    assert_eq!(cells[0].source(), [video, video].concat());
}

#[test]
fn spacing_macros_drop_their_argument() {
    let doc = r"
\begin{document}
\begin{frame}
\frametitle{Title}
\hspace{0.1in} hello
\hspace*{0.1in} world
\vspace{0.1in} hola
\vspace*{0.1in} namaste
\end{frame}
\end{document}
";
    let cells = parse(doc);

    assert_eq!(
        cells[0].source(),
        ["## Title\n", " hello\n world\n hola\n namaste\n"]
    );
}

#[test]
fn quote_center_and_hrule() {
    let doc = r"
\begin{document}
\begin{frame}
\begin{center}
\begin{quote}
To do
or not to do.
\end{quote}
\hrule
\end{center}
\end{frame}
\end{document}
";
    let cells = parse(doc);

    assert_eq!(
        cells[0].source(),
        ["> To do\n", "> or not to do.\n", "\n----\n"]
    );
}

#[test]
fn document_sections() {
    let doc = r"
\begin{document}
\section{Introduction}
\subsection{Motivation}
\subsubsection{Blah}
\section{Methods}
\end{document}
";
    let cells = parse(doc);

    assert_eq!(
        sources(&cells),
        vec![
            vec!["## Introduction\n".to_string()],
            vec!["### Motivation\n".to_string()],
            vec!["#### Blah\n".to_string()],
            vec!["## Methods\n".to_string()],
        ]
    );
    assert!(cells
        .iter()
        .all(|c| (c.kind(), c.slide_type()) == (CellKind::Markdown, SlideType::Slide)));
}

#[test]
fn frame_options_and_minipage_are_dropped() {
    let doc = r"
\begin{document}
\begin{frame}[fragile]
hello world
\end{frame}
\begin{frame}
\begin{minipage}
hello world
\end{minipage}
\end{frame}
\end{document}
";
    let cells = parse(doc);

    assert_eq!(
        sources(&cells),
        vec![
            vec!["hello world\n".to_string()],
            vec!["hello world\n".to_string()]
        ]
    );
}

#[test]
fn inline_equations_are_copied() {
    let doc = r"
\begin{document}
\begin{frame}
$\int f(x) dx$
\begin{itemize}
\item hello $\alpha + \frac{1}{2} \beta_{\gamma}$ world
\end{itemize}
\end{frame}
\end{document}
";
    let cells = parse(doc);

    assert_eq!(
        cells[0].source(),
        [
            "$\\int f(x) dx$\n\n",
            "* hello $\\alpha + \\frac{1}{2} \\beta_{\\gamma}$ world\n"
        ]
    );
}

#[test]
fn escaped_dollar_does_not_start_math() {
    let cells = parse("\\begin{document}\\begin{frame}Costs \\$5 \\emph{only}\\end{frame}\\end{document}");
    assert_eq!(cells[0].source(), ["Costs \\$5*only* "]);
}

#[test]
fn display_equations() {
    let doc = r"
\begin{document}
\begin{frame}
\begin{equation}
\alpha + \frac{1}{2} \beta_1
\end{equation}
\begin{align*}
\beta = \gamma
\end{align*}
\[v_\theta = \frac{\Gamma}{2\pi r}\]
\end{frame}
\end{document}
";
    let cells = parse(doc);

    assert_eq!(
        cells[0].source(),
        [
            "$$\n",
            "\\alpha + \\frac{1}{2} \\beta_1\n",
            "$$\n",
            "$$\n",
            "\\beta = \\gamma\n",
            "$$\n",
            "$$\n",
            "v_\\theta = \\frac{\\Gamma}{2\\pi r}\n",
            "$$\n"
        ]
    );
}

#[test]
fn pause_at_start_keeps_the_slide() {
    let doc = r"
\begin{document}
\begin{frame}
\pause
\begin{itemize}
\item item 1
\item item 2
\end{itemize}
\end{frame}
\end{document}
";
    let cells = parse(doc);

    assert_eq!(
        kinds(&cells),
        vec![
            (CellKind::Markdown, SlideType::Slide),
            (CellKind::Markdown, SlideType::Fragment),
        ]
    );
    assert_eq!(cells[1].source(), ["* item 1\n\n", "* item 2\n"]);
}

#[test]
fn pause_adds_fragments() {
    let doc = r"
\begin{document}
\begin{frame}
\begin{itemize}
\item item 1
\pause
\item item 2
\end{itemize}
\begin{lstlisting}
print 1
\end{lstlisting}
\pause
\begin{lstlisting}
print 2
\end{lstlisting}
\end{frame}
\end{document}
";
    let cells = parse(doc);

    assert_eq!(
        kinds(&cells),
        vec![
            (CellKind::Markdown, SlideType::Slide),
            (CellKind::Markdown, SlideType::Fragment),
            (CellKind::Code, SlideType::Continuation),
            (CellKind::Code, SlideType::Fragment),
        ]
    );
    assert_eq!(cells[0].source(), ["* item 1\n"]);
    assert_eq!(cells[1].source(), ["* item 2\n"]);
    assert_eq!(cells[2].source(), ["print 1\n"]);
    assert_eq!(cells[3].source(), ["print 2\n"]);
}

#[test]
fn background_pictures() {
    let doc = r"
\begin{document}
\BackgroundPicture{images/img1.png}
\BackgroundPicture{images/blank}
\BackgroundPictureWidth{images/img2.jpg}
\BackgroundPictureWidth{images/blank}
\BackgroundPictureHeight{images/img3.jpg}
\BackgroundPictureHeight{images/blank.png}
\end{document}
";
    let cells = parse(doc);

    assert_eq!(
        sources(&cells),
        vec![
            vec!["<img width=\"100%\" src=\"images/img1.png\"/>\n".to_string()],
            vec!["<img width=\"100%\" src=\"images/img2.jpg\"/>\n".to_string()],
            vec!["<img height=\"100%\" src=\"images/img3.jpg\"/>\n".to_string()],
        ]
    );
    assert!(cells.iter().all(|c| c.slide_type() == SlideType::Slide));
}

#[test]
fn text_embellishments() {
    let doc = r"
\begin{document}
\begin{frame}
\textbf{bold} \emph{emph} \texttt{texttt} \lstinline{code}
\typ{code} \kwrd{for} hello \ldots
\end{frame}
\begin{frame}
\emph{emph}
\end{frame}
\begin{frame}
\texttt{texttt}
\end{frame}
\end{document}
";
    let cells = parse(doc);

    assert_eq!(
        sources(&cells),
        vec![
            vec!["**bold** *emph* `texttt` `code` `code` `for` hello ...".to_string()],
            vec!["*emph* ".to_string()],
            vec!["`texttt` ".to_string()],
        ]
    );
}

#[test]
fn title_can_have_text_embellishments() {
    let doc = r"
\begin{document}
\begin{frame}
\frametitle{\emph{emph} \textbf{bold} $\alpha$  \lstinline{print}}
\end{frame}
\end{document}
";
    let cells = parse(doc);
    assert_eq!(cells[0].source()[0], "## *emph* **bold** $\\alpha$  `print` \n");
}

#[test]
fn unknown_macros_stay_in_the_source() {
    let doc = r"
\begin{document}
\begin{frame}
\something
\other{hello}
\end{frame}
\end{document}
";
    let cells = parse(doc);
    assert_eq!(cells[0].source(), ["\\something \\other hello"]);
}

#[test]
fn blocks() {
    let with_title = r"
\begin{document}
\begin{frame}
\begin{block}{Test block}
Hello world
\end{block}
\end{frame}
\end{document}
";
    assert_eq!(parse(with_title)[0].source(), ["### Test block\n", "Hello world\n"]);

    let without_title = r"
\begin{document}
\begin{frame}
\begin{block}
Hello world
\end{block}
\end{frame}
\end{document}
";
    assert_eq!(parse(without_title)[0].source(), ["### \n", "Hello world\n"]);
}

#[test]
fn content_outside_document_is_ignored() {
    assert!(parse("\\begin{frame}x\\end{frame}").is_empty());
    assert!(parse("").is_empty());
}

#[test]
fn malformed_source_is_a_parse_error() {
    let err = Converter::new()
        .parse("\\begin{document}\\begin{frame}\\end{document}")
        .unwrap_err();
    assert!(matches!(err, ConvertError::Parse(_)));
}

#[test]
fn conversion_is_deterministic() {
    assert_eq!(parse(TITLE_DOC), parse(TITLE_DOC));
}

#[test]
fn one_slide_cell_per_slide_macro() {
    let doc = r"
\begin{document}
\section{A}
\begin{frame}
a \pause b \pause c
\end{frame}
\subsection{B}
\BackgroundPicture{images/x.png}
\begin{frame}
\pause
d
\end{frame}
\end{document}
";
    let cells = parse(doc);
    let slides = cells
        .iter()
        .filter(|c| c.slide_type() == SlideType::Slide)
        .count();

    assert_eq!(slides, 5);
    assert_eq!(
        cells
            .iter()
            .filter(|c| c.slide_type() == SlideType::Fragment)
            .count(),
        3
    );
}

#[test]
fn handlers_can_be_overridden() {
    let handlers = HandlerSet::default().with(
        "frame",
        |walker: &mut Walker<'_>, node: &Node| -> Result<Flow, ConvertError> {
            handlers::frame(walker, node)?;
            walker.state.cells.push_fragment("## Overloaded\n");
            Ok(Flow::Descend)
        },
    );
    let converter = Converter::with_handlers(handlers);
    let cells = converter
        .parse("\\begin{document}\\begin{frame}\n\\frametitle{Foo}\nHello world\n\\end{frame}\\end{document}")
        .unwrap();

    let text = cells[0].text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines, vec!["## Overloaded", "## Foo", "Hello world"]);
}

#[test]
fn handlers_can_be_aliased() {
    let mut converter = Converter::new();
    converter.handlers_mut().alias("shell", "texttt").unwrap();
    let cells = converter
        .parse("\\begin{document}\\begin{frame}\\shell{ls -l}\\end{frame}\\end{document}")
        .unwrap();

    assert_eq!(cells[0].source(), ["`ls -l` "]);
}

#[test]
fn alias_of_unknown_handler_fails() {
    let mut set = HandlerSet::default();
    assert!(matches!(
        set.alias("shell", "nothing"),
        Err(ConvertError::UnknownHandler(name)) if name == "nothing"
    ));
}

#[test]
fn starred_names_share_a_key() {
    let set = HandlerSet::default();
    assert!(set.contains("equation*"));
    assert!(set.contains("equation_star"));
    assert_eq!(handlers::handler_key("hspace*"), "hspace_star");
}

#[test]
fn fallback_can_be_replaced() {
    let mut set = HandlerSet::default();
    set.set_fallback(|_walker: &mut Walker<'_>, _node: &Node| Ok(Flow::Skip));
    let cells = Converter::with_handlers(set)
        .parse("\\begin{document}\\begin{frame}\\foo{bar}\\end{frame}\\end{document}")
        .unwrap();

    assert!(cells[0].source().is_empty());
}

#[test]
fn frame_title_argument() {
    let cells = parse("\\begin{document}\\begin{frame}[fragile]{Results}\nhello\n\\end{frame}\\end{document}");

    assert_eq!(kinds(&cells), vec![(CellKind::Markdown, SlideType::Slide)]);
    assert_eq!(cells[0].source(), ["## Results\n", "hello\n"]);
}

#[test]
fn center_walks_its_brace_arguments() {
    let cells = parse("\\begin{document}\\begin{frame}\\begin{center}{\\Large hi}\\end{center}\\end{frame}\\end{document}");
    assert_eq!(cells[0].source(), [" hi"]);
}

#[test]
fn space_before_macro_argument() {
    let doc = r"
\begin{document}
\section {Intro}
\begin{frame}
\frametitle {Spaced}
\textbf {key} idea
\end{frame}
\end{document}
";
    let cells = parse(doc);

    assert_eq!(
        sources(&cells),
        vec![
            vec!["## Intro\n".to_string()],
            vec!["## Spaced\n".to_string(), "**key** idea\n".to_string()],
        ]
    );
}

#[test]
fn preamble_definitions_may_split_environments() {
    let doc = r"
\documentclass{beamer}
\newenvironment{foo}{\begin{center}}{\end{center}}
\newcommand{\bi}{\begin{itemize}}
\begin{document}
\begin{frame}
x
\end{frame}
\end{document}
";
    let cells = parse(doc);
    assert_eq!(sources(&cells), vec![vec!["x\n".to_string()]]);
}

#[test]
fn text_after_nested_listing_stays_out_of_the_code_cell() {
    let doc = r"
\begin{document}
\begin{frame}
\begin{block}{T}
\begin{lstlisting}
x = 1
\end{lstlisting}
\end{block}
after
\end{frame}
\end{document}
";
    let cells = parse(doc);

    assert_eq!(
        kinds(&cells),
        vec![
            (CellKind::Markdown, SlideType::Slide),
            (CellKind::Code, SlideType::Continuation),
            (CellKind::Markdown, SlideType::Continuation),
        ]
    );
    assert_eq!(cells[1].source(), ["x = 1\n"]);
    assert_eq!(cells[2].source(), ["after\n"]);
}
