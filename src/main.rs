// src/main.rs

use warmrun::{cli, logging, run};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("warmrun error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    logging::init_logging(&args)?;
    run(args).await
}
