use std::io::{BufRead, Write};

use colored::Colorize;
use tl_ledger::{Ledger, TrackingProjection};
use tl_server::EventForm;

use crate::cli::OutputFormat;
use crate::render;

/// Whether the loop should keep reading input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// An interactive tracking session over one in-memory ledger.
///
/// Each input line is either a command or `<package_id> <status...>`.
/// An event line goes through the same presence check as the HTTP form,
/// appends one record and re-renders the whole chain.
pub struct TrackSession<W> {
    ledger: Ledger,
    out: W,
    format: OutputFormat,
}

impl<W: Write> TrackSession<W> {
    pub fn new(ledger: Ledger, out: W, format: OutputFormat) -> Self {
        Self { ledger, out, format }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn run<R: BufRead>(&mut self, input: R) -> anyhow::Result<()> {
        render::render_chain(&mut self.out, &self.ledger, self.format)?;
        self.prompt()?;
        for line in input.lines() {
            if self.handle_line(&line?)? == Flow::Quit {
                break;
            }
            self.prompt()?;
        }
        Ok(())
    }

    fn prompt(&mut self) -> anyhow::Result<()> {
        if self.format == OutputFormat::Text {
            write!(self.out, "{} ", ">".bold())?;
            self.out.flush()?;
        }
        Ok(())
    }

    pub fn handle_line(&mut self, line: &str) -> anyhow::Result<Flow> {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        match (head, rest) {
            ("", _) => {}
            ("quit" | "exit", "") => return Ok(Flow::Quit),
            ("help", "") => self.help()?,
            ("list", "") => render::render_chain(&mut self.out, &self.ledger, self.format)?,
            ("validate", "") => {
                render::render_report(&mut self.out, &self.ledger.report(), self.format)?
            }
            ("history", "") => {
                render::render_error(&mut self.out, "usage: history <package_id>", self.format)?
            }
            ("history", package_id) => {
                let projection = TrackingProjection::build(&self.ledger);
                render::render_history(
                    &mut self.out,
                    package_id,
                    projection.package(package_id),
                    self.format,
                )?;
            }
            (package_id, status) => self.submit(package_id, status)?,
        }
        Ok(Flow::Continue)
    }

    fn submit(&mut self, package_id: &str, status: &str) -> anyhow::Result<()> {
        let form = EventForm {
            package_id: package_id.to_string(),
            status: status.to_string(),
        };
        let event = match form.into_event() {
            Ok(event) => event,
            Err(err) => return render::render_error(&mut self.out, &err.to_string(), self.format),
        };

        let digest = self.ledger.append(event).digest();
        tracing::debug!(digest = %digest.short_hex(), "tracking event recorded");
        if self.format == OutputFormat::Text {
            writeln!(self.out, "{} New tracking event added.", "✓".green().bold())?;
        }
        render::render_chain(&mut self.out, &self.ledger, self.format)
    }

    fn help(&mut self) -> anyhow::Result<()> {
        writeln!(self.out, "  <package_id> <status>  record a tracking event")?;
        writeln!(self.out, "  list                   show the chain")?;
        writeln!(self.out, "  validate               check chain integrity")?;
        writeln!(self.out, "  history <package_id>   show one package's events")?;
        writeln!(self.out, "  quit                   leave")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tl_types::TrackingEvent;

    use super::*;

    fn session() -> TrackSession<Vec<u8>> {
        colored::control::set_override(false);
        TrackSession::new(Ledger::new(), Vec::new(), OutputFormat::Text)
    }

    fn output(session: &TrackSession<Vec<u8>>) -> String {
        String::from_utf8(session.out.clone()).unwrap()
    }

    #[test]
    fn event_line_appends_one_record() {
        let mut s = session();
        assert_eq!(s.handle_line("PKG1 Shipped").unwrap(), Flow::Continue);
        assert_eq!(s.ledger().len(), 2);
        assert_eq!(
            s.ledger().head().payload().as_tracking(),
            Some(&TrackingEvent::new("PKG1", "Shipped"))
        );
        let text = output(&s);
        assert!(text.contains("New tracking event added."));
        assert!(text.contains("### Block 1"));
    }

    #[test]
    fn status_may_contain_spaces() {
        let mut s = session();
        s.handle_line("PKG2   Out for delivery ").unwrap();
        assert_eq!(
            s.ledger().head().payload().as_tracking(),
            Some(&TrackingEvent::new("PKG2", "Out for delivery"))
        );
    }

    #[test]
    fn missing_status_does_not_append() {
        let mut s = session();
        s.handle_line("PKG1").unwrap();
        assert_eq!(s.ledger().len(), 1);
        assert!(output(&s).contains("please fill in: status"));
    }

    #[test]
    fn bare_history_prints_usage() {
        let mut s = session();
        s.handle_line("history").unwrap();
        assert_eq!(s.ledger().len(), 1);
        let text = output(&s);
        assert!(text.contains("usage: history <package_id>"));
        assert!(!text.contains("please fill in"));
    }

    #[test]
    fn json_mode_form_error_is_json() {
        let mut s = TrackSession::new(Ledger::new(), Vec::new(), OutputFormat::Json);
        s.handle_line("PKG1").unwrap();
        assert_eq!(s.ledger().len(), 1);
        let value: serde_json::Value = serde_json::from_str(&output(&s)).unwrap();
        assert_eq!(value["error"], "invalid event: please fill in: status");
    }

    #[test]
    fn blank_line_is_ignored() {
        let mut s = session();
        s.handle_line("   ").unwrap();
        assert_eq!(s.ledger().len(), 1);
        assert!(output(&s).is_empty());
    }

    #[test]
    fn commands_do_not_append() {
        let mut s = session();
        s.handle_line("PKG1 Shipped").unwrap();
        s.handle_line("validate").unwrap();
        s.handle_line("list").unwrap();
        s.handle_line("history PKG1").unwrap();
        assert_eq!(s.ledger().len(), 2);
        let text = output(&s);
        assert!(text.contains("Checked 2 records"));
        assert!(text.contains("Package PKG1"));
    }

    #[test]
    fn run_stops_at_quit() {
        let mut s = session();
        let input = b"PKG1 Shipped\nquit\nPKG1 Delivered\n";
        s.run(&input[..]).unwrap();
        assert_eq!(s.ledger().len(), 2);
        assert!(s.ledger().validate());
    }

    #[test]
    fn run_to_end_of_input() {
        let mut s = session();
        s.run(&b"PKG1 Shipped\nPKG1 Delivered"[..]).unwrap();
        assert_eq!(s.ledger().len(), 3);
    }
}
