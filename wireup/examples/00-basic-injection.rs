use wireup::instance::InstancePtr;
use wireup::{provider, Injectable, Registry};

// this is a trait we would like to use in our service
// note: resolved traits need Send + Sync, since instances are shared between threads
trait Greeter: Send + Sync {
    fn greet(&self);
}

// this is a dependency which implements the above trait
#[derive(Injectable, Default)]
struct EnglishGreeter;

// we're telling the registry to provide EnglishGreeter when asked for dyn Greeter
#[provider]
impl Greeter for EnglishGreeter {
    fn greet(&self) {
        println!("Hello world!");
    }
}

// this is a type with a dependency
#[derive(Injectable, Default)]
struct Reception {
    // the registry will fill this field when building up Reception
    #[inject]
    greeter: Option<InstancePtr<dyn Greeter>>,
    // fields without #[inject] are left as they were constructed
    visitors: u32,
}

impl Reception {
    fn welcome(&self) {
        if let Some(greeter) = &self.greeter {
            greeter.greet();
        }
    }
}

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    let registry = Registry::new();

    // Reception is not registered anywhere, so it gets default constructed and built up
    let reception = registry
        .resolve::<Reception>()
        .expect("error resolving Reception");

    // prints "Hello world!"
    reception.welcome();
    println!("Visitors so far: {}", reception.visitors);

    // dyn Greeter has been discovered and is now cached, so the same instance is returned
    let greeter = registry
        .resolve_provided::<dyn Greeter>()
        .expect("error resolving dyn Greeter");

    assert!(InstancePtr::ptr_eq(
        &greeter,
        reception.greeter.as_ref().expect("missing greeter")
    ));
}
