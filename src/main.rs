#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = question_bank::run().await {
        eprintln!("question-bank fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
