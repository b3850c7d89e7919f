#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = exam_transcripts::run().await {
        eprintln!("exam-transcripts fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
