use super::{open_page, Page};
use crate::PageArgs;
use crate::cache::FetchPlan;
use crate::table::{self, Column, TableEvent, TableProps};
use crate::types::Language;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

const HELP: &str = "\
Type to edit the search text (applied after a pause), or:
  :blur             apply the search text now
  :lang <name>      javascript | scala | python
  :sort <column>    stars | forks | updated (again to flip order)
  :page <n>         :next :prev :first :last
  :per-page <n>
  :quit";

#[derive(Debug, PartialEq)]
pub enum Input {
    Event(TableEvent),
    Nothing,
    Help,
    Invalid(String),
    Quit,
}

pub fn parse_input(line: &str, props: &TableProps<'_>) -> Input {
    let Some(command) = line.strip_prefix(':') else {
        return Input::Event(TableEvent::SearchQueryChanged(line.to_string()));
    };
    let mut words = command.split_whitespace();
    let name = words.next().unwrap_or("");
    let arg = words.next();
    let number = || arg.and_then(|a| a.parse::<u32>().ok());

    match name {
        "q" | "quit" | "exit" => Input::Quit,
        "help" | "h" => Input::Help,
        "blur" => Input::Event(TableEvent::SearchQueryBlurred),
        "lang" => match arg.and_then(Language::from_param) {
            Some(lang) => Input::Event(TableEvent::LanguageChanged(lang)),
            None => Input::Invalid(format!("unknown language {:?}", arg.unwrap_or(""))),
        },
        "sort" => {
            let column = match arg {
                Some("stars") => Column::Stars,
                Some("forks") => Column::Forks,
                Some("updated") => Column::Updated,
                other => return Input::Invalid(format!("can't sort by {:?}", other.unwrap_or(""))),
            };
            props
                .header_clicked(column)
                .map(Input::Event)
                .unwrap_or(Input::Nothing)
        }
        "next" => props.next_page().map(Input::Event).unwrap_or(Input::Nothing),
        "prev" => props.previous_page().map(Input::Event).unwrap_or(Input::Nothing),
        "first" => Input::Event(props.first_page()),
        "last" => Input::Event(props.last_page()),
        "page" => match number() {
            Some(n) if n >= 1 => Input::Event(props.go_to(n - 1)),
            _ => Input::Invalid("page needs a number from 1".to_string()),
        },
        "per-page" => match number() {
            Some(n) => Input::Event(props.set_page_size(n)),
            None => Input::Invalid("per-page needs a number".to_string()),
        },
        other => Input::Invalid(format!("unknown command :{}", other)),
    }
}

fn draw(page: &Page, width: u16) {
    let view = page.view();
    println!();
    println!("{}", table::render(&page.props(), width, chrono::Utc::now()));
    if let Some(err) = &view.error {
        println!("Search failed: {}", err);
    }
    println!("{}", page.store().navigation().href());
}

/// Points the view at the current parameters and runs any needed fetch in the
/// background; `done` is pinged when it lands.
fn start_fetch(page: &mut Page, done: &mpsc::UnboundedSender<()>) {
    let plan = page.show_current();
    if matches!(plan, FetchPlan::Hit) {
        return;
    }
    let orchestrator = page.orchestrator().clone();
    let params = page.params().clone();
    let done = done.clone();
    tokio::spawn(async move {
        orchestrator.resolve(&params, plan).await;
        let _ = done.send(());
    });
}

pub async fn interactive(args: &PageArgs, token: Option<String>) -> anyhow::Result<()> {
    let mut page = open_page(args, token)?;
    let (done_tx, mut done_rx) = mpsc::unbounded_channel();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", HELP);
    start_fetch(&mut page, &done_tx);
    draw(&page, args.width);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(line.trim_end(), &page.props()) {
                    Input::Quit => break,
                    Input::Help => println!("{}", HELP),
                    Input::Nothing => {}
                    Input::Invalid(msg) => eprintln!("{}", msg),
                    Input::Event(event) => {
                        let typing = matches!(event, TableEvent::SearchQueryChanged(_));
                        if page.handle(event) {
                            start_fetch(&mut page, &done_tx);
                        }
                        if !typing {
                            draw(&page, args.width);
                        }
                    }
                }
            }
            changed = page.next_debounced() => {
                if changed {
                    start_fetch(&mut page, &done_tx);
                    draw(&page, args.width);
                }
            }
            Some(()) = done_rx.recv() => {
                page.sync_view();
                draw(&page, args.width);
            }
        }
    }

    page.dispose();
    Ok(())
}
