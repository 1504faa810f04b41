//! `portsync` binary entrypoint.

#[tokio::main(flavor = "current_thread")]
async fn main() {
    std::process::exit(portsync_cli::run().await);
}
