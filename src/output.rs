//! Output formatting for the non-interactive commands

use crate::outline::Outline;
use crate::search::panel::NO_RESULTS_TEXT;
use crate::search::{ResultPanel, SearchResult, Segment, highlight};
use serde::Serialize;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

fn stdout(color: bool) -> StandardStream {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

/// Print the outline, indented by heading level
pub fn print_outline(outline: &Outline, color: bool) -> io::Result<()> {
    write_outline(&mut stdout(color), outline)
}

/// Print search results with the query highlighted
pub fn print_results(results: &[SearchResult<'_>], query: &str, color: bool) -> io::Result<()> {
    write_results(&mut stdout(color), results, query)
}

/// Print search results as the HTML fragment of a result panel
pub fn print_html(results: &[SearchResult<'_>], query: &str) -> io::Result<()> {
    write_html(&mut io::stdout().lock(), results, query)
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)
}

pub fn write_outline<W: WriteColor>(out: &mut W, outline: &Outline) -> io::Result<()> {
    for node in outline {
        let indent = "  ".repeat(node.level.saturating_sub(2) as usize);
        write!(out, "{indent}{}", node.text.trim())?;

        out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        write!(out, "  #{}", node.id)?;
        out.reset()?;
        writeln!(out)?;
    }
    Ok(())
}

pub fn write_results<W: WriteColor>(
    out: &mut W,
    results: &[SearchResult<'_>],
    query: &str,
) -> io::Result<()> {
    if results.is_empty() {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
        write!(out, "{NO_RESULTS_TEXT}")?;
        out.reset()?;
        writeln!(out)?;
        return Ok(());
    }

    for result in results {
        // Kind label
        out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)).set_bold(true))?;
        write!(out, "{}", result.unit.kind)?;
        out.reset()?;
        write!(out, ": ")?;

        write_segments(out, &highlight(&result.context, query))?;
        writeln!(out)?;
    }

    Ok(())
}

pub fn write_html<W: Write>(out: &mut W, results: &[SearchResult<'_>], query: &str) -> io::Result<()> {
    let mut panel = ResultPanel::new();
    panel.render(results, query);
    writeln!(out, "{}", panel.to_html())
}

/// Write segments, marking matches in bold red
fn write_segments<W: WriteColor>(out: &mut W, segments: &[Segment]) -> io::Result<()> {
    for segment in segments {
        match segment {
            Segment::Plain(text) => write!(out, "{text}")?,
            Segment::Mark(text) => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
                write!(out, "{text}")?;
                out.reset()?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::load_markdown;
    use crate::outline::{OutlineContainer, build_outline};
    use crate::search::{SearchOptions, scan};
    use termcolor::Buffer;

    fn as_text(buffer: Buffer) -> String {
        String::from_utf8(buffer.into_inner()).unwrap()
    }

    #[test]
    fn test_write_outline() {
        let mut doc = load_markdown("## Setup {#setup}\n\n### Wiring\n\n## Flight\n");
        let outline = build_outline(&mut doc, Some(&mut OutlineContainer::new()));

        let mut buffer = Buffer::no_color();
        write_outline(&mut buffer, &outline).unwrap();

        assert_eq!(
            as_text(buffer),
            "Setup  #setup\n  Wiring  #heading-1\nFlight  #heading-2\n"
        );
    }

    #[test]
    fn test_write_results() {
        let doc = load_markdown("## Getting Started\n\nConnect the drone via USB cable.\n");
        let results = scan(&doc, "drone", &SearchOptions::default());

        let mut buffer = Buffer::no_color();
        write_results(&mut buffer, &results, "drone").unwrap();

        assert_eq!(as_text(buffer), "paragraph: Connect the drone via USB cable.\n");
    }

    #[test]
    fn test_write_no_results() {
        let mut buffer = Buffer::no_color();
        write_results(&mut buffer, &[], "gimbal").unwrap();
        assert_eq!(as_text(buffer), "No results found\n");
    }

    #[test]
    fn test_write_html_escapes_and_marks() {
        let doc = load_markdown("Wire `<GND>` to the drone & power on.\n");
        let results = scan(&doc, "drone", &SearchOptions::default());

        let mut out = Vec::new();
        write_html(&mut out, &results, "drone").unwrap();
        let html = String::from_utf8(out).unwrap();

        assert!(html.starts_with("<div class=\"search-result\">"));
        assert!(html.contains("<div class=\"search-result-type\">paragraph</div>"));
        assert!(html.contains("Wire &lt;GND&gt; to the <mark>drone</mark> &amp; power on."));
        assert!(html.ends_with("</div></div>\n"));
    }

    #[test]
    fn test_write_html_placeholder() {
        let mut out = Vec::new();
        write_html(&mut out, &[], "gimbal").unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "<div class=\"search-no-results\">No results found</div>\n"
        );
    }

    #[test]
    fn test_colored_output_marks_match() {
        let doc = load_markdown("Connect the drone.\n");
        let results = scan(&doc, "drone", &SearchOptions::default());

        let mut buffer = Buffer::ansi();
        write_results(&mut buffer, &results, "drone").unwrap();

        let text = as_text(buffer);
        assert!(text.contains("\u{1b}["));
        assert!(text.contains("drone"));
    }
}
