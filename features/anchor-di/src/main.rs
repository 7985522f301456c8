use std::sync::Arc;

use anchor_di::{provides, Component, Constructor, ContainerError, ServiceContainer};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), ContainerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .init();

    let mut container = ServiceContainer::new();
    container
        .bind::<dyn Greeter, Greeting>()?
        .bind_self::<Audience>()?;
    container.bind_instance("world".to_string())?;
    container.force_resolve()?;

    println!("{:?}", container);
    let greeter = container.single::<dyn Greeter>()?;
    println!("{}", greeter.greet());
    Ok(())
}

trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

#[derive(Debug)]
struct Audience {
    name: Arc<String>,
}
impl Component for Audience {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|name: Arc<String>| Audience { name })]
    }
}

struct Greeting {
    audience: Arc<Audience>,
}
impl Greeter for Greeting {
    fn greet(&self) -> String {
        format!("hello {}", self.audience.name)
    }
}
impl Component for Greeting {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|audience: Arc<Audience>| Greeting { audience })]
    }
}
provides!(Greeting => dyn Greeter);
