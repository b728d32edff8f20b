// note: this example assumes you've analyzed the previous ones
// try running it with: RUST_LOG=wireup=debug WIREUP_DEFAULT_CONSTRUCTION=false

use tracing_subscriber::EnvFilter;
use wireup::instance::InstancePtr;
use wireup::{provider, Injectable, Registry};

trait Greeter: Send + Sync {
    fn greet(&self);
}

#[derive(Injectable, Default)]
struct EnglishGreeter;

#[provider]
impl Greeter for EnglishGreeter {
    fn greet(&self) {
        println!("Hello world!");
    }
}

#[derive(Injectable, Default)]
struct Reception {
    #[inject]
    greeter: Option<InstancePtr<dyn Greeter>>,
}

//noinspection DuplicatedCode
fn main() {
    // the registry reports what it does via tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // config is read from wireup.json in the working directory (if present) and WIREUP_*
    // environment variables, e.g. WIREUP_DISCOVERY=false
    let registry = Registry::from_environment().expect("error reading registry config");
    println!("Using config: {:?}", registry.config());

    match registry.resolve::<Reception>() {
        Ok(reception) => {
            if let Some(greeter) = &reception.greeter {
                greeter.greet();
            }
        }
        Err(error) => println!("Cannot resolve Reception: {error}"),
    }
}
