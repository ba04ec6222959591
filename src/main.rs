use charset::charset;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let results = charset(std::env::args_os().skip(1), &mut std::io::stdout().lock());
    if let Err(error) = &results {
        if let Some(usage) = error.downcast_ref::<clap::Error>() {
            usage.exit();
        }
    }
    results
}
