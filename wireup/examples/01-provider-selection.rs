// note: this example assumes you've analyzed the previous one

use wireup::config::{AmbiguityPolicy, RegistryConfig};
use wireup::instance::InstancePtr;
use wireup::{provider, Injectable, Registry};

trait Greeter: Send + Sync {
    fn greet(&self);
}

#[derive(Injectable, Default)]
struct EnglishGreeter;

// if the same trait is implemented for multiple types, one can be marked as primary to always
// win discovery
#[provider(primary)]
impl Greeter for EnglishGreeter {
    fn greet(&self) {
        println!("Hello world!");
    }
}

#[derive(Injectable, Default)]
struct PolishGreeter;

#[provider]
impl Greeter for PolishGreeter {
    fn greet(&self) {
        println!("Witaj świecie!");
    }
}

trait Farewell: Send + Sync {
    fn bid(&self);
}

#[derive(Injectable, Default)]
struct ShortFarewell;

// without a primary provider, the one with the highest priority wins (the default priority is 0)
#[provider(priority = 10)]
impl Farewell for ShortFarewell {
    fn bid(&self) {
        println!("Bye!");
    }
}

#[derive(Injectable, Default)]
struct LongFarewell;

#[provider]
impl Farewell for LongFarewell {
    fn bid(&self) {
        println!("Goodbye and see you soon!");
    }
}

#[derive(Injectable, Default)]
struct FormalFarewell;

// manual providers are never discovered - they need to be registered explicitly
#[provider(manual)]
impl Farewell for FormalFarewell {
    fn bid(&self) {
        println!("Farewell, dear guest.");
    }
}

//noinspection DuplicatedCode
fn main() {
    let registry = Registry::new();

    // prints "Hello world!"
    registry
        .resolve_provided::<dyn Greeter>()
        .expect("error resolving dyn Greeter")
        .greet();

    // prints "Bye!"
    registry
        .resolve_provided::<dyn Farewell>()
        .expect("error resolving dyn Farewell")
        .bid();

    // explicit registrations always take precedence over discovery
    let registry = Registry::new();
    registry.register::<dyn Farewell, FormalFarewell>();

    // prints "Farewell, dear guest."
    registry
        .resolve_provided::<dyn Farewell>()
        .expect("error resolving dyn Farewell")
        .bid();

    // ready instances can be registered as well
    let registry = Registry::new();
    registry.register_instance::<dyn Greeter>(InstancePtr::new(PolishGreeter));

    // prints "Witaj świecie!"
    registry
        .resolve_provided::<dyn Greeter>()
        .expect("error resolving dyn Greeter")
        .greet();

    // a strict registry refuses to choose between equally ranked providers
    let registry = Registry::builder()
        .with_config(RegistryConfig::default().with_ambiguity(AmbiguityPolicy::Strict))
        .build();

    // prints "Hello world!" since there's a primary provider
    registry
        .resolve_provided::<dyn Greeter>()
        .expect("error resolving dyn Greeter")
        .greet();
}
