use crate::configuration::{Origin, Settings};
use crate::images::{FileImages, HttpImages, ImageFetch};
use crate::keyboard::Key;
use crate::loader::{fetch_book, BookSource, FileSource, HttpSource};
use crate::models::Action;
use crate::navigator::Intent;
use crate::render;
use crate::router::Registry;
use crate::validation::validate;
use crate::viewer::{Command, Effect, Event, Viewer};
use anyhow::bail;
use log::{debug, error, info};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

const HELP: &str = "h/left  l/right  p(revious)  n(ext)  c(over)  home  back  forward  go <path>  q(uit)";

/// A line typed at the reader prompt.
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    Help,
    Quit,
}

pub fn parse_input(line: &str) -> Option<Input> {
    let line = line.trim();
    let command = match line {
        "h" | "left" => Command::Key(Key::ArrowLeft),
        "l" | "right" => Command::Key(Key::ArrowRight),
        "p" | "previous" | "<" => Command::Press(Intent::Previous),
        "n" | "next" | "finish" => Command::Press(Intent::Next),
        ">" => Command::Press(Intent::Advance),
        "c" | "cover" => Command::Press(Intent::Cover),
        "home" => Command::Press(Intent::Home),
        "back" => Command::Back,
        "forward" => Command::Forward,
        "?" | "help" => return Some(Input::Help),
        "q" | "quit" => return Some(Input::Quit),
        _ => match line.strip_prefix("go ") {
            Some(path) => Command::Go(path.trim().to_string()),
            None => return None,
        },
    };
    Some(Input::Command(command))
}

pub async fn run(settings: Settings, action: Action) -> anyhow::Result<()> {
    let origin = settings.origin()?;
    info!("Asset origin: {}", settings.asset_origin);
    let registry = Registry::new(settings.books);
    debug!("Books {:?}", registry.books());

    match (action, origin) {
        (Action::List, _) => {
            print!("{}", render::home(&registry));
            Ok(())
        }
        (Action::Read { route }, Origin::Remote(base)) => {
            read(registry, &route, HttpSource::new(base.clone()), HttpImages::new(base)).await
        }
        (Action::Read { route }, Origin::Local(root)) => {
            read(registry, &route, FileSource::new(&root), FileImages::new(root)).await
        }
        (Action::Validate { check_images }, Origin::Remote(base)) => {
            let images = check_images.then(|| HttpImages::new(base.clone()));
            check(&registry, &HttpSource::new(base), images.as_ref()).await
        }
        (Action::Validate { check_images }, Origin::Local(root)) => {
            let images = check_images.then(|| FileImages::new(&root));
            check(&registry, &FileSource::new(root), images.as_ref()).await
        }
    }
}

async fn read<S, P>(registry: Registry, start: &str, source: S, images: P) -> anyhow::Result<()>
where
    S: BookSource + Clone + Send + Sync + 'static,
    P: ImageFetch + Clone + Send + Sync + 'static,
{
    let (tx, mut rx) = unbounded_channel();
    let mut viewer = Viewer::new(registry, start);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let effects = viewer.start();
    perform(effects, &source, &images, &tx);
    show(&viewer);

    loop {
        let effects = tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_input(&line) {
                    Some(Input::Command(command)) => viewer.handle(command),
                    Some(Input::Quit) => break,
                    Some(Input::Help) | None => {
                        println!("{}", HELP);
                        continue;
                    }
                }
            }
            Some(event) = rx.recv() => viewer.on_event(event),
        };
        perform(effects, &source, &images, &tx);
        show(&viewer);
    }

    info!("Finished!");
    Ok(())
}

fn show(viewer: &Viewer) {
    println!("{}", viewer.location());
    print!("{}", viewer.screen());
}

/// Starts each effect as its own task; results are reported back on `tx`.
fn perform<S, P>(effects: Vec<Effect>, source: &S, images: &P, tx: &UnboundedSender<Event>)
where
    S: BookSource + Clone + Send + Sync + 'static,
    P: ImageFetch + Clone + Send + Sync + 'static,
{
    for effect in effects {
        let tx = tx.clone();
        match effect {
            Effect::Fetch(ticket) => {
                let source = source.clone();
                tokio::spawn(async move {
                    let result = fetch_book(&source, ticket.source_id()).await;
                    let _ = tx.send(Event::Fetched(ticket, result));
                });
            }
            Effect::Preload(request) => {
                let images = images.clone();
                tokio::spawn(async move {
                    let result = images.fetch_image(request.image()).await;
                    let _ = tx.send(Event::ImageSettled(request, result));
                });
            }
        }
    }
}

async fn check<S, P>(registry: &Registry, source: &S, images: Option<&P>) -> anyhow::Result<()>
where
    S: BookSource,
    P: ImageFetch,
{
    let mut failures = 0;
    for entry in registry.books() {
        let source_id = entry.source_id();
        info!("Checking {}", source_id);

        let book = match fetch_book(source, &source_id).await {
            Ok(book) => book,
            Err(e) => {
                error!("{}: {}", source_id, e);
                failures += 1;
                continue;
            }
        };

        let mut problems: Vec<String> = validate(&book, &source_id)
            .iter()
            .map(ToString::to_string)
            .collect();
        if book.book_key != entry.key {
            problems.push(format!(
                "bookKey \"{}\" is registered as \"{}\"",
                book.book_key, entry.key
            ));
        }
        if let Some(images) = images {
            for page in book.pages.iter().filter(|p| p.has_image()) {
                if let Err(e) = images.fetch_image(&page.image).await {
                    problems.push(e.to_string());
                }
            }
        }

        for problem in &problems {
            error!("{}: {}", source_id, problem);
        }
        if problems.is_empty() {
            info!("{}: {} pages OK", source_id, book.len());
        } else {
            failures += 1;
        }
    }

    if failures > 0 {
        bail!("{} of {} books have problems", failures, registry.books().len());
    }
    info!("Finished!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::BookEntry;

    #[test]
    fn parse_inputs() {
        assert_eq!(
            Some(Input::Command(Command::Key(Key::ArrowLeft))),
            parse_input("h")
        );
        assert_eq!(
            Some(Input::Command(Command::Press(Intent::Next))),
            parse_input(" next ")
        );
        assert_eq!(
            Some(Input::Command(Command::Go("/super-bowie/3".into()))),
            parse_input("go /super-bowie/3")
        );
        assert_eq!(Some(Input::Quit), parse_input("q"));
        assert_eq!(None, parse_input("jump"));
    }

    #[tokio::test]
    async fn check_local_books() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("books/super-bowie")).unwrap();
        std::fs::write(
            dir.path().join("books/super-bowie.yaml"),
            "bookKey: super-bowie\ntitle: Super Bowie\npages:\n  - image: /books/super-bowie/0-cover.jpg\n    text: Super Bowie\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("books/super-bowie/0-cover.jpg"), b"jpg").unwrap();

        let mut books = vec![BookEntry {
            key: "super-bowie".into(),
            title: "Super Bowie".into(),
            source: None,
        }];
        let source = FileSource::new(dir.path());
        let images = FileImages::new(dir.path());
        check(&Registry::new(books.clone()), &source, Some(&images))
            .await
            .unwrap();

        books.push(BookEntry {
            key: "ziggy".into(),
            title: "Ziggy".into(),
            source: None,
        });
        let err = check(&Registry::new(books), &source, Some(&images))
            .await
            .unwrap_err();
        assert_eq!("1 of 2 books have problems", err.to_string());
    }
}
