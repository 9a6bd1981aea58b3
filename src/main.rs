#[tokio::main]
async fn main() -> anyhow::Result<()> {
    blockwatch::node::run_cli().await
}
