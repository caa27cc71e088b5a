use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use gamevault_core::{
    CatalogService, CatalogSnapshot, DetailTracker, FetchTicket, GameDraft, GameId, GameRecord,
    LibraryCategory, SearchDebouncer,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    spawn,
    sync::mpsc,
};
use tracing::{debug, error, info};

const HELP: &str = "\
commands:
  type <text>              update the search box (debounced)
  search [text]            submit the search immediately
  genre <id|all>           filter by genre
  platform <id|all>        filter by platform
  more                     load the next page
  retry                    repeat the last failed request
  list                     show loaded games
  genres | platforms       show available filters
  show <id>                show game details
  add <id> <category>      add a game to collection, wishlist or completed
  remove <id> <category>   remove a game from a library category
  library [category]       show the library
  custom name|description|rating|released|image|genres
                           add a hand-made game to the collection
  help | quit";

/// A single line of user input.
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Type(String),
    Search(Option<String>),
    Genre(Option<u64>),
    Platform(Option<u64>),
    More,
    Retry,
    List,
    Genres,
    Platforms,
    Show(GameId),
    Add(GameId, LibraryCategory),
    Remove(GameId, LibraryCategory),
    Library(Option<LibraryCategory>),
    Custom(Box<GameDraft>),
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb {
            "type" => Command::Type(rest.to_string()),
            "search" => Command::Search((!rest.is_empty()).then(|| rest.to_string())),
            "genre" => Command::Genre(parse_filter(rest)?),
            "platform" => Command::Platform(parse_filter(rest)?),
            "more" => Command::More,
            "retry" => Command::Retry,
            "list" => Command::List,
            "genres" => Command::Genres,
            "platforms" => Command::Platforms,
            "show" => Command::Show(parse_id(rest)?),
            "add" | "remove" => {
                let (id, category) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| anyhow!("usage: {verb} <id> <category>"))?;
                let id = parse_id(id)?;
                let category = category.trim().parse::<LibraryCategory>()?;
                if verb == "add" {
                    Command::Add(id, category)
                } else {
                    Command::Remove(id, category)
                }
            }
            "library" if rest.is_empty() => Command::Library(None),
            "library" => Command::Library(Some(rest.parse()?)),
            "custom" => Command::Custom(Box::new(parse_draft(rest)?)),
            "help" | "" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => bail!("unknown command `{other}`; type `help`"),
        };
        Ok(command)
    }
}

fn parse_id(value: &str) -> Result<GameId> {
    value
        .trim()
        .parse()
        .with_context(|| format!("`{value}` is not a numeric id"))
}

fn parse_filter(value: &str) -> Result<Option<u64>> {
    match value {
        "" | "all" => Ok(None),
        other => parse_id(other).map(Some),
    }
}

fn parse_draft(value: &str) -> Result<GameDraft> {
    let fields: Vec<&str> = value.split('|').collect();
    let [name, description, rating, released, image, genres] = fields[..] else {
        bail!("usage: custom name|description|rating|released|image|genres");
    };
    Ok(GameDraft {
        name: name.to_string(),
        description: description.to_string(),
        rating: rating.to_string(),
        released: released.to_string(),
        image: image.to_string(),
        genres: genres.to_string(),
    })
}

/// Line-oriented frontend over the catalog service.
pub struct GamevaultApp {
    service: CatalogService,
    debouncer: SearchDebouncer,
    details: DetailTracker,
}

impl GamevaultApp {
    pub fn new(service: CatalogService, debouncer: SearchDebouncer) -> Self {
        Self {
            service,
            debouncer,
            details: DetailTracker::new(),
        }
    }

    pub async fn run(&mut self, mut commits: mpsc::UnboundedReceiver<String>) -> Result<()> {
        println!("{HELP}");
        let service = self.service.clone();
        spawn(async move { service.refresh_taxonomy().await });
        self.dispatch(self.service.begin_refresh());

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("failed to read stdin")? else {
                        break;
                    };
                    match line.parse::<Command>() {
                        Ok(Command::Quit) => break,
                        Ok(command) => self.handle(command),
                        Err(err) => println!("error: {err:#}"),
                    }
                }
                Some(text) = commits.recv() => {
                    info!(%text, "debounced search committed");
                    self.dispatch(self.service.begin_search(text));
                }
            }
        }

        self.details.teardown();
        Ok(())
    }

    fn handle(&mut self, command: Command) {
        debug!(?command, "handling command");
        match command {
            Command::Type(text) => self.debouncer.on_input_changed(text),
            Command::Search(text) => {
                if let Some(text) = text {
                    self.debouncer.on_input_changed(text);
                }
                self.debouncer.submit();
            }
            Command::Genre(genre) => self.dispatch(self.service.begin_genre(genre)),
            Command::Platform(platform) => self.dispatch(self.service.begin_platform(platform)),
            Command::More => self.dispatch(self.service.begin_load_more()),
            Command::Retry => self.dispatch(self.service.begin_retry()),
            Command::List => print_games(&self.service.snapshot()),
            Command::Genres => {
                for genre in self.service.snapshot().genres {
                    println!("{:>6}  {}", genre.id, genre.name);
                }
            }
            Command::Platforms => {
                for platform in self.service.snapshot().platforms {
                    println!("{:>6}  {} ({})", platform.id, platform.name, platform.slug);
                }
            }
            Command::Show(id) => {
                let ticket = self.details.issue();
                let service = self.service.clone();
                spawn(async move {
                    match service.load_detail(&ticket, id).await {
                        Some(Ok(game)) => print_detail(&game),
                        Some(Err(err)) => println!("error: {err}"),
                        None => {}
                    }
                });
            }
            Command::Add(id, category) => self.add(id, category),
            Command::Remove(id, category) => {
                if self.service.remove_from_library(id, category) {
                    println!("removed {id} from {category}");
                } else {
                    println!("{id} is not in {category}");
                }
            }
            Command::Library(category) => {
                let categories = match category {
                    Some(category) => vec![category],
                    None => LibraryCategory::ALL.to_vec(),
                };
                for category in categories {
                    let games = self.service.library_category(category);
                    println!("{category} ({})", games.len());
                    for game in games {
                        println!("  {:>8}  {}", game.id, game.display_name());
                    }
                }
            }
            Command::Custom(draft) => match draft.validate() {
                Ok(game) => {
                    let name = game.display_name();
                    self.service
                        .add_to_library(game, LibraryCategory::Collection);
                    println!("added {name} to collection");
                }
                Err(errors) => {
                    for err in errors {
                        println!("error: {err}");
                    }
                }
            },
            Command::Help => println!("{HELP}"),
            Command::Quit => {}
        }
    }

    // The query already moved in `begin_*`; only the network wait is spawned.
    fn dispatch(&self, ticket: Option<FetchTicket>) {
        if let Some(ticket) = ticket {
            let service = self.service.clone();
            spawn(async move { service.fetch(ticket).await });
        }
    }

    fn add(&self, id: GameId, category: LibraryCategory) {
        let known = self
            .service
            .snapshot()
            .games
            .into_iter()
            .find(|game| game.id == id);
        let service = self.service.clone();
        spawn(async move {
            let game = match known {
                Some(game) => game,
                None => match service.get_game_details(id).await {
                    Ok(game) => game,
                    Err(err) => {
                        error!(id, %err, "cannot add unknown game");
                        println!("error: {err}");
                        return;
                    }
                },
            };
            let name = game.display_name();
            if service.add_to_library(game, category) {
                println!("added {name} to {category}");
            } else {
                println!("{name} is already in {category}");
            }
        });
    }
}

fn print_games(snapshot: &CatalogSnapshot) {
    if let Some(err) = &snapshot.error {
        println!("error: {err} (type `retry` to try again)");
    }
    if snapshot.loading && snapshot.games.is_empty() {
        println!("loading games…");
        return;
    }
    for game in &snapshot.games {
        let rating = game
            .rating
            .map(|value| format!("{value:.1}"))
            .unwrap_or_else(|| "-".to_string());
        println!("{:>8}  {:<4}  {}", game.id, rating, game.display_name());
    }
    let status = match (snapshot.loading, snapshot.has_more) {
        (true, _) => "loading…",
        (false, true) => "type `more` for the next page",
        (false, false) => "end of results",
    };
    println!("{} games, page {}: {status}", snapshot.games.len(), snapshot.page);
}

fn print_detail(game: &GameRecord) {
    println!("{}", game.display_name());
    if let Some(rating) = game.rating {
        println!("rating: {rating:.2}");
    }
    if !game.genres.is_empty() {
        let genres: Vec<_> = game.genres.iter().map(|g| g.name.as_str()).collect();
        println!("genres: {}", genres.join(", "));
    }
    if !game.platforms.is_empty() {
        let platforms: Vec<_> = game.platforms.iter().map(|p| p.name.as_str()).collect();
        println!("platforms: {}", platforms.join(", "));
    }
    if let Some(description) = &game.description {
        println!("\n{description}");
    }
}
