// src/main.rs

use fetchbin::{FetchbinError, cli, logging, run};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("fetchbin error: {err:?}");
        let code = err
            .downcast_ref::<FetchbinError>()
            .map(FetchbinError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await?;
    Ok(())
}
