//! Line-oriented host for running the widget in a terminal.
//!
//! Dialogs are printed, prompts read the next input line (end of input counts
//! as cancel), and pages that would open in a browser are printed as URLs.

use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::str::FromStr;

use crate::page::{EventKind, Navigator, NodeId, SessionStorage, UserInteraction};
use crate::widget::Storefront;
use crate::Result;

pub const HELP: &str = "\
commands:
  show               print the page
  cart               print the cart summary
  controls           list clickable and selectable nodes
  click <node>       click a node, e.g. `click 42`
  sort <criteria>    name-asc | name-desc | price-asc | price-desc | default
  filter <category>  a category, or `all`
  tick               expire finished animations
  help               this text
  quit";

pub struct ConsoleHost<R, W> {
    input: R,
    output: W,
    session: HashMap<String, String>,
}

impl<R: BufRead, W: Write> ConsoleHost<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output, session: HashMap::new() }
    }

    pub fn with_session_item(mut self, key: &str, value: &str) -> Self {
        self.session.insert(key.to_string(), value.to_string());
        self
    }

    /// Next input line without its line ending; `None` at end of input.
    pub fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "console input failed");
                None
            }
        }
    }

    pub fn write_line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.output, "{text}").and_then(|_| self.output.flush()) {
            tracing::warn!(error = %e, "console output failed");
        }
    }

    pub fn into_output(self) -> W { self.output }
}

impl<R: BufRead, W: Write> UserInteraction for ConsoleHost<R, W> {
    fn notify(&mut self, message: &str) { self.write_line(&format!("[notice] {message}")); }

    fn prompt(&mut self, message: &str) -> Option<String> {
        self.write_line(&format!("[prompt] {message}"));
        self.read_line()
    }
}

impl<R: BufRead, W: Write> Navigator for ConsoleHost<R, W> {
    fn redirect(&mut self, url: &str) { self.write_line(&format!("[redirect] {url}")); }
    fn open_new(&mut self, url: &str) { self.write_line(&format!("[open] {url}")); }
}

impl<R, W> SessionStorage for ConsoleHost<R, W> {
    fn get_item(&self, key: &str) -> Option<String> { self.session.get(key).cloned() }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show,
    Cart,
    Controls,
    Click(NodeId),
    Sort(String),
    Filter(String),
    Tick,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;
    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let verb = parts.next().unwrap_or_default();
        let rest = parts.collect::<Vec<_>>().join(" ");
        match (verb, rest.as_str()) {
            ("show", _) => Ok(Self::Show),
            ("cart", _) => Ok(Self::Cart),
            ("controls", _) => Ok(Self::Controls),
            ("click", node) => node.parse().map(Self::Click).map_err(|_| format!("not a node id: {node:?}")),
            ("sort", criteria) => Ok(Self::Sort(criteria.to_string())),
            ("filter", "") => Err("filter needs a category".to_string()),
            ("filter", category) => Ok(Self::Filter(category.to_string())),
            ("tick", _) => Ok(Self::Tick),
            ("help", _) | ("?", _) => Ok(Self::Help),
            ("quit", _) | ("exit", _) => Ok(Self::Quit),
            (other, _) => Err(format!("unknown command: {other:?} (try `help`)")),
        }
    }
}

/// Reads commands from the host's input until `quit` or end of input.
/// Finished pulses are cleared before each command runs.
pub fn run<R: BufRead, W: Write>(widget: &mut Storefront<ConsoleHost<R, W>>) -> Result<()> {
    widget.host_mut().write_line(HELP);
    while let Some(line) = widget.host_mut().read_line() {
        widget.tick();
        if line.trim().is_empty() { continue; }
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(message) => {
                widget.host_mut().write_line(&message);
                continue;
            }
        };
        match command {
            Command::Show => {
                let html = widget.html();
                widget.host_mut().write_line(&html);
            }
            Command::Cart => {
                let summary = cart_summary(widget);
                widget.host_mut().write_line(&summary);
            }
            Command::Controls => {
                let listing = widget
                    .controls()
                    .into_iter()
                    .map(|(node, kind, action)| format!("{node:>5} {:<6} {action}", event_name(kind)))
                    .collect::<Vec<_>>()
                    .join("\n");
                widget.host_mut().write_line(&listing);
            }
            Command::Click(node) => {
                if !widget.click(node)? {
                    widget.host_mut().write_line(&format!("nothing listens for clicks on {node}"));
                }
            }
            Command::Sort(criteria) => {
                let select = widget.sort_select();
                widget.change(select, &criteria)?;
            }
            Command::Filter(category) => {
                let select = widget.filter_select();
                widget.change(select, &category)?;
            }
            Command::Tick => widget.tick(),
            Command::Help => widget.host_mut().write_line(HELP),
            Command::Quit => break,
        }
    }
    Ok(())
}

fn event_name(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Click => "click",
        EventKind::Change => "change",
    }
}

fn cart_summary<R: BufRead, W: Write>(widget: &Storefront<ConsoleHost<R, W>>) -> String {
    let doc = widget.document();
    let mut lines: Vec<String> = doc
        .query_class_within(widget.cart_items(), "cart-item")
        .into_iter()
        .map(|row| {
            doc.children(row)
                .iter()
                .filter(|child| !doc.has_class(**child, "remove-from-cart"))
                .map(|child| doc.text_content(*child))
                .collect::<Vec<_>>()
                .join("  ")
        })
        .collect();
    if lines.is_empty() {
        lines.push("(cart is empty)".to_string());
    }
    lines.push(doc.text_content(widget.cart_total_node()));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WidgetConfig;
    use crate::domain::aggregates::Catalog;
    use crate::page::RecordingHost;
    use crate::widget::Boot;
    use std::io::Cursor;

    type TestHost = ConsoleHost<Cursor<String>, Vec<u8>>;

    fn boot(script: &str) -> Storefront<TestHost> { boot_with(&WidgetConfig::default(), script) }

    fn boot_with(config: &WidgetConfig, script: &str) -> Storefront<TestHost> {
        let host = ConsoleHost::new(Cursor::new(script.to_string()), Vec::new()).with_session_item("loggedIn", "true");
        match Storefront::boot(config, Catalog::sample(), host).unwrap() {
            Boot::Mounted(widget) => *widget,
            Boot::Redirected(_) => panic!("expected the widget to mount"),
        }
    }

    /// Node ids are deterministic for a given catalog, so a reference mount finds them.
    fn add_to_cart_node(index: usize) -> NodeId {
        let config = WidgetConfig::default();
        match Storefront::boot(&config, Catalog::sample(), RecordingHost::logged_in("loggedIn")).unwrap() {
            Boot::Mounted(widget) => widget.document().query_class("add-to-cart")[index],
            Boot::Redirected(_) => panic!("expected the widget to mount"),
        }
    }

    fn output(widget: Storefront<TestHost>) -> String {
        String::from_utf8(widget.into_host().into_output()).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!("click 12".parse::<Command>(), Ok(Command::Click("12".parse().unwrap())));
        assert_eq!("sort price-asc".parse::<Command>(), Ok(Command::Sort("price-asc".into())));
        assert_eq!("filter smart phone".parse::<Command>(), Ok(Command::Filter("smart phone".into())));
        assert!("filter".parse::<Command>().is_err());
        assert!("click here".parse::<Command>().is_err());
        assert!("dance".parse::<Command>().is_err());
        assert_eq!("exit".parse::<Command>(), Ok(Command::Quit));
    }

    #[test]
    fn test_prompt_reads_next_line_and_eof_cancels() {
        let mut host = ConsoleHost::new(Cursor::new("great phone\r\n".to_string()), Vec::new());
        assert_eq!(host.prompt("Enter your review:").as_deref(), Some("great phone"));
        assert_eq!(host.prompt("Enter your review:"), None);
        let out = String::from_utf8(host.into_output()).unwrap();
        assert_eq!(out.matches("[prompt] Enter your review:").count(), 2);
    }

    #[test]
    fn test_redirect_without_session() {
        let host = ConsoleHost::new(Cursor::new(String::new()), Vec::new());
        let Boot::Redirected(host) = Storefront::boot(&WidgetConfig::default(), Catalog::sample(), host).unwrap() else {
            panic!("expected a redirect");
        };
        assert_eq!(String::from_utf8(host.into_output()).unwrap(), "[redirect] login.html\n");
    }

    #[test]
    fn test_scripted_session() {
        let add = add_to_cart_node(0);
        let script = format!("click {add}\nclick {add}\ncart\nsort price-desc\nbogus\nquit\nshow\n");
        let mut widget = boot(&script);
        run(&mut widget).unwrap();
        assert_eq!(widget.cart().lines()[0].quantity.value(), 2);
        let out = output(widget);
        assert_eq!(out.matches("[notice] Item added to cart!").count(), 2);
        assert!(out.contains("phone 1 (2)  ₹6,658.00\nTotal: ₹6,658.00"));
        assert!(out.contains("unknown command: \"bogus\""));
        // quit stops before `show`
        assert!(!out.contains("<div class=\"storefront\">"));
    }

    #[test]
    fn test_review_prompt_consumes_input_line() {
        let config = WidgetConfig::default();
        let reference = match Storefront::boot(&config, Catalog::sample(), RecordingHost::logged_in("loggedIn")).unwrap() {
            Boot::Mounted(widget) => widget.document().query_class("add-review")[1],
            Boot::Redirected(_) => panic!("expected the widget to mount"),
        };
        let mut widget = boot(&format!("click {reference}\nlasts all day\nquit\n"));
        run(&mut widget).unwrap();
        assert_eq!(widget.catalog().get(crate::ProductId::new(2)).unwrap().reviews(), ["lasts all day"]);
        assert!(output(widget).contains("[notice] Review added successfully!"));
    }

    #[test]
    fn test_finished_pulses_clear_before_next_command() {
        let add = add_to_cart_node(3);
        let config = WidgetConfig { pulse: chrono::Duration::zero(), ..WidgetConfig::default() };
        let mut widget = boot_with(&config, &format!("click {add}
cart
quit
"));
        run(&mut widget).unwrap();
        assert_eq!(widget.cart().len(), 1);
        assert_eq!(widget.pending_pulses(), 0);
        assert!(widget.document().query_class("pulse").is_empty());
    }

    #[test]
    fn test_running_pulses_survive_next_command() {
        let add = add_to_cart_node(3);
        let config = WidgetConfig { pulse: chrono::Duration::milliseconds(60_000), ..WidgetConfig::default() };
        let mut widget = boot_with(&config, &format!("click {add}
cart
"));
        run(&mut widget).unwrap();
        assert_eq!(widget.pending_pulses(), 7);
        assert_eq!(widget.document().query_class("pulse").len(), 7);
    }

    #[test]
    fn test_empty_cart_buy_all() {
        let mut widget = boot("");
        let node = widget.buy_all_button();
        widget.click(node).unwrap();
        let out = output(widget);
        assert!(out.contains("[notice] Your cart is empty!"));
        assert!(!out.contains("[open]"));
    }
}
