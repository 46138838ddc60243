//! Discovers a device, prepares one of its actions and invokes it.
//!
//! ```text
//! cargo run -p pmoexplorer --example explore -- <server> <service> [<action> [name=value]...]
//! ```
//!
//! Without an action, the actions of the service are listed instead.

use std::env;

use anyhow::{Context, bail};
use pmoexplorer::{ArgValue, ExplorerConfig, UpnpExplorer};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let config = ExplorerConfig::load(None)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log.filter))
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let (server_name, service_type) = match args.as_slice() {
        [server, service, ..] => (server.as_str(), service.as_str()),
        _ => bail!("usage: explore <server> <service> [<action> [name=value]...]"),
    };

    let explorer = UpnpExplorer::new();
    let registry = explorer.discover(&config)?;
    for record in registry.iter() {
        println!("{:<50} {}", record.id, record.location());
    }

    let server = registry.resolve(server_name, 0)?;
    let device = explorer.describe(server)?;
    let service = explorer.describe_service(device.service(service_type)?)?;

    let Some(action) = args.get(2) else {
        for signature in service.list_actions()? {
            let inputs: Vec<&str> = signature.inputs.iter().map(|a| a.name.as_str()).collect();
            let outputs: Vec<&str> = signature.outputs.iter().map(|a| a.name.as_str()).collect();
            println!(
                "{}({}) -> ({})",
                signature.name,
                inputs.join(", "),
                outputs.join(", ")
            );
        }
        return Ok(());
    };

    let overrides = args[3..]
        .iter()
        .map(|pair| {
            let (name, value) = pair
                .split_once('=')
                .with_context(|| format!("expected name=value, got '{}'", pair))?;
            let value = match value.parse::<i64>() {
                Ok(n) => ArgValue::Int(n),
                Err(_) => ArgValue::from(value),
            };
            Ok((name.to_string(), value))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let context = service.prepare_action(action)?;
    for name in context.unresolved() {
        println!("No default for {}, pass {}=<value>", name, name);
    }

    let request = context.into_request(service.descriptor(), overrides)?;
    let response = explorer.invoke(&request)?;
    println!("HTTP {}\n{}", response.status, response.text());
    Ok(())
}
