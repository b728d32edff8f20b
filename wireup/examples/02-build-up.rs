// note: this example assumes you've analyzed the previous ones

use std::error::Error;
use std::fmt::{Display, Formatter};
use wireup::instance::{convert_error, InstancePtr};
use wireup::{provider, Injectable, Registry, ResolutionError};

trait Database: Send + Sync {
    fn url(&self) -> &str;
}

#[derive(Injectable, Default)]
struct InMemoryDatabase;

#[provider]
impl Database for InMemoryDatabase {
    fn url(&self) -> &str {
        "memory://"
    }
}

struct RemoteDatabase {
    url: String,
}

impl Database for RemoteDatabase {
    fn url(&self) -> &str {
        &self.url
    }
}

trait Mailer: Send + Sync {}

#[derive(Debug)]
struct MissingUrl;

impl Display for MissingUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "missing database url")
    }
}

impl Error for MissingUrl {}

// instances which are created elsewhere can still get their dependencies injected
#[derive(Injectable)]
struct Repository {
    #[inject]
    database: Option<InstancePtr<dyn Database>>,
    table: String,
}

#[derive(Injectable, Default)]
struct Newsletter {
    #[inject]
    database: Option<InstancePtr<dyn Database>>,
    // nothing provides dyn Mailer, so building up Newsletter will fail
    #[inject]
    mailer: Option<InstancePtr<dyn Mailer>>,
}

//noinspection DuplicatedCode
fn main() {
    let registry = Registry::new();

    let repository = registry
        .build_up(Repository {
            database: None,
            table: "users".to_string(),
        })
        .expect("error building up Repository");

    // prints "users @ memory://"
    println!(
        "{} @ {}",
        repository.table,
        repository.database.as_ref().expect("missing database").url()
    );

    // failed build-up reports which field could not be injected; fields injected before the
    // failing one stay filled
    let mut newsletter = Newsletter::default();
    if let Err(ResolutionError::DependencyMissing {
        owner,
        field,
        dependency,
    }) = registry.build_up_in_place(&mut newsletter)
    {
        println!("Cannot inject {owner}::{field} of type {dependency}.");
    }
    println!("Database injected: {}", newsletter.database.is_some());

    // missing dependencies can also be checked up front
    for field in registry.unresolvable_dependencies::<Newsletter>() {
        println!("Unresolvable: {} ({})", field.name, field.type_name);
    }

    // custom factories are called once, on first use
    let registry = Registry::new();
    registry.register_factory::<dyn Database, _>(|_| {
        std::env::var("DATABASE_URL")
            .map(|url| InstancePtr::new(RemoteDatabase { url }) as InstancePtr<dyn Database>)
            .map_err(|_| convert_error(MissingUrl))
    });

    match registry.resolve_provided::<dyn Database>() {
        Ok(database) => println!("Using {}", database.url()),
        Err(error) => println!("{error}"),
    }
}
